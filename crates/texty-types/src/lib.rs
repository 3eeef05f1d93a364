//! Shared wire types for the Texty shared-document service.
//!
//! These types cross the HTTP boundary and flow to the frontend as
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for subscription sessions
//! - [`snapshot`] -- The `{text, lockHolder}` state pushed to subscribers
//! - [`api`] -- Request and response bodies for text and lock operations

pub mod api;
pub mod ids;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use api::{Ack, LockRequest, TextUpdate};
pub use ids::SubscriberId;
pub use snapshot::Snapshot;
