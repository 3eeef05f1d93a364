//! HTTP API server for the Texty shared document.
//!
//! This crate exposes the [`LockCoordinator`] over HTTP:
//!
//! - **REST endpoints** for reading the document, writing it, and taking
//!   or releasing the write lock
//! - **Server-Sent Events** (`/subscribe`) and **`WebSocket`** (`/ws`)
//!   streams that push a full snapshot on every committed change
//!
//! # Architecture
//!
//! Handlers are a thin decoding layer. Sequencing, lock policy, and
//! fan-out all live in [`texty_core`]; each push connection owns one
//! [`SubscriptionSession`] whose drop frees its registry slot.
//!
//! [`LockCoordinator`]: texty_core::LockCoordinator
//! [`SubscriptionSession`]: texty_core::SubscriptionSession

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sse;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
