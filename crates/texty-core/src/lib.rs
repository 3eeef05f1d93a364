//! Document state, lock coordination, and subscriber fan-out for Texty.
//!
//! Texty holds one shared text document. A client may edit it only while
//! holding a cooperative lock, and every accepted change is pushed as a
//! full [`Snapshot`](texty_types::Snapshot) to every live subscriber.
//!
//! # Modules
//!
//! - [`document`] -- The document and its lock policy (pure state machine)
//! - [`coordinator`] -- Serializes every operation and triggers broadcasts
//! - [`registry`] -- Concurrent-safe subscriber set with non-blocking fan-out
//! - [`session`] -- Per-connection `Connecting -> Active -> Closed` lifecycle
//! - [`config`] -- Typed `texty-config.yaml` loading
//! - [`error`] -- Lock-policy and transport error types

pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod registry;
pub mod session;

pub use config::{ConfigError, ServiceConfig};
pub use coordinator::LockCoordinator;
pub use document::Document;
pub use error::{LockError, TransportGone};
pub use registry::{BroadcastRegistry, Subscriber};
pub use session::{SessionState, SubscriptionSession};
