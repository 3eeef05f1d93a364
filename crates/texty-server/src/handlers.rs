//! REST endpoint handlers for the Texty API.
//!
//! Handlers decode the request, call the [`LockCoordinator`] and map its
//! result to a response. The lock policy lives entirely in the core.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Redirect to the frontend |
//! | `GET` | `/hello` | Plain-text greeting |
//! | `GET` | `/text` | Current `{text, lockHolder}` |
//! | `POST` | `/text` | Replace the text (lock holder only) |
//! | `POST` | `/lock` | Acquire the write lock |
//! | `POST` | `/unlock` | Release the write lock |
//!
//! [`LockCoordinator`]: texty_core::LockCoordinator

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use texty_types::{Ack, LockRequest, Snapshot, TextUpdate};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Plain-text body served by `GET /hello`.
pub const GREETING: &str = "Hello, Texty.";

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// GET / and GET /hello
// ---------------------------------------------------------------------------

/// Send browsers to the frontend application.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.frontend_url.clone())],
    )
}

/// Liveness greeting.
pub async fn hello() -> &'static str {
    GREETING
}

// ---------------------------------------------------------------------------
// /text
// ---------------------------------------------------------------------------

/// Return the current document snapshot. Never fails.
pub async fn get_text(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.coordinator.read().await)
}

/// Replace the document text.
///
/// Succeeds only for the current lock holder. A missing `text` field
/// writes the empty string.
pub async fn set_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextUpdate>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let TextUpdate { user_id, text } = decode(payload)?;
    debug!(user_id = %user_id, "set-text requested");
    state.coordinator.write(&user_id, text).await?;
    Ok(Json(Ack::OK))
}

// ---------------------------------------------------------------------------
// /lock and /unlock
// ---------------------------------------------------------------------------

/// Acquire the write lock for `userId`.
pub async fn acquire_lock(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LockRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let LockRequest { user_id } = decode(payload)?;
    state.coordinator.acquire(&user_id).await?;
    Ok(Json(Ack::OK))
}

/// Release the write lock held by `userId`.
pub async fn release_lock(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LockRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let LockRequest { user_id } = decode(payload)?;
    state.coordinator.release(&user_id).await?;
    Ok(Json(Ack::OK))
}
