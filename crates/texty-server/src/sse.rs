//! Server-Sent Events transport for document snapshots.
//!
//! Clients connect to `GET /subscribe` and receive one `update` event per
//! committed change, starting with the current state:
//!
//! ```text
//! event: update
//! data: {"text":"hello","lockHolder":"A"}
//! ```
//!
//! The response body owns the [`SubscriptionSession`]. When the client
//! goes away the body is dropped, which closes the session and frees its
//! registry slot.
//!
//! [`SubscriptionSession`]: texty_core::SubscriptionSession

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt as _};
use tracing::info;

use crate::state::AppState;

/// Name of the SSE event carrying a snapshot.
pub const UPDATE_EVENT: &str = "update";

/// Open an event stream of document snapshots.
///
/// # Route
///
/// `GET /subscribe`
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let session = state.coordinator.subscribe().await;
    info!(subscriber = %session.id(), "SSE stream opened");

    let events = session.map(|snapshot| Event::default().event(UPDATE_EVENT).json_data(&snapshot));

    Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive))
}
