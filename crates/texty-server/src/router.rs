//! Axum router construction for the Texty API.
//!
//! Assembles all routes (REST + SSE + `WebSocket`) into a single
//! [`Router`] with CORS middleware so the frontend can be served from a
//! different origin.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, sse, ws};

/// Build the complete Axum router for the Texty server.
///
/// The router includes:
/// - `GET /` -- redirect to the frontend
/// - `GET /hello` -- plain-text greeting
/// - `GET /text`, `POST /text` -- read and write the document
/// - `POST /lock`, `POST /unlock` -- acquire and release the write lock
/// - `GET /subscribe` -- Server-Sent Events snapshot stream
/// - `GET /ws` -- `WebSocket` snapshot stream
///
/// CORS allows any origin; preflight `OPTIONS` requests are answered by
/// the CORS layer.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::index))
        .route("/hello", get(handlers::hello))
        // Document
        .route("/text", get(handlers::get_text).post(handlers::set_text))
        .route("/lock", post(handlers::acquire_lock))
        .route("/unlock", post(handlers::release_lock))
        // Push transports
        .route("/subscribe", get(sse::subscribe))
        .route("/ws", get(ws::ws_subscribe))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
