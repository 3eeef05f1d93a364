//! Error taxonomy for document and subscriber operations.
//!
//! [`LockError`] covers the lock-policy failures that are reported to
//! the caller of the failing operation. [`TransportGone`] never leaves
//! the core: the registry recovers from it by dropping the subscriber.

use texty_types::SubscriberId;

/// A rejected document operation.
///
/// All variants are expected, recoverable outcomes of the lock policy.
/// None of them mutates the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// The request carried no client identifier.
    #[error("no identifier provided")]
    MissingIdentifier,

    /// A write was attempted by a client that does not hold the lock.
    #[error("write forbidden: caller does not hold the lock")]
    Forbidden,

    /// The lock is owned by another client.
    #[error("lock is owned by another user")]
    Denied,

    /// A release was attempted by a client that does not hold the lock.
    #[error("caller does not own the lock")]
    NotOwner,
}

/// A snapshot could not be handed to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportGone {
    /// The receiving session has been dropped or closed.
    #[error("subscriber {0} disconnected")]
    Disconnected(SubscriberId),

    /// The subscriber's outbound buffer is full.
    #[error("subscriber {0} fell behind its buffer")]
    Lagging(SubscriberId),
}
