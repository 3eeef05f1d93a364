//! `WebSocket` transport for document snapshots.
//!
//! Clients connect to `GET /ws` and receive a JSON-encoded snapshot as a
//! text frame for every committed change, starting with the current
//! state. This carries the same session contract as the SSE stream for
//! clients that prefer a socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming snapshots.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_subscribe(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Forward every snapshot of a fresh session as a text frame until either
/// side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut session = state.coordinator.subscribe().await;
    debug!(subscriber = %session.id(), "WebSocket client connected");

    loop {
        tokio::select! {
            next = session.recv() => {
                let Some(snapshot) = next else {
                    debug!(subscriber = %session.id(), "Session evicted, closing WebSocket");
                    break;
                };
                let json = match serde_json::to_string(&snapshot) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize snapshot: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(subscriber = %session.id(), "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %session.id(), "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %session.id(), "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Snapshots flow one way; client frames are ignored.
                    }
                }
            }
        }
    }

    session.close();
}
