//! Serialized access to the shared document.
//!
//! # Architecture
//!
//! [`LockCoordinator`] owns the single [`Document`] behind a
//! [`tokio::sync::Mutex`]. Each operation holds that mutex for its whole
//! check-then-mutate-then-broadcast step, which gives one total order
//! over all operations. Because fan-out is non-blocking, broadcasting
//! under the mutex never waits on a subscriber, and every session sees
//! snapshots in exactly the order the mutations were committed.
//!
//! The subscriber set has its own lock inside [`BroadcastRegistry`];
//! sessions can leave without touching the document mutex.

use std::sync::Arc;

use texty_types::Snapshot;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::SubscriberConfig;
use crate::document::Document;
use crate::error::LockError;
use crate::registry::BroadcastRegistry;
use crate::session::SubscriptionSession;

/// Sequencer for every read, write, lock, and subscribe operation.
#[derive(Debug)]
pub struct LockCoordinator {
    document: Mutex<Document>,
    registry: Arc<BroadcastRegistry>,
    buffer_capacity: usize,
}

impl LockCoordinator {
    /// Create a coordinator over an empty document.
    ///
    /// `buffer_capacity` is the number of snapshots each subscriber may
    /// have queued before it is evicted.
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            document: Mutex::new(Document::new()),
            registry: Arc::new(BroadcastRegistry::new()),
            buffer_capacity,
        }
    }

    /// Create a coordinator from the subscriber configuration section.
    pub fn from_config(config: &SubscriberConfig) -> Self {
        Self::new(config.buffer_capacity)
    }

    /// Current document snapshot.
    pub async fn read(&self) -> Snapshot {
        self.document.lock().await.snapshot()
    }

    /// Replace the text on behalf of `caller` and broadcast the result.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Forbidden`] if `caller` does not hold the lock.
    pub async fn write(&self, caller: &str, text: String) -> Result<(), LockError> {
        let mut doc = self.document.lock().await;
        doc.write(caller, text)?;
        let delivered = self.publish(&doc);
        debug!(caller, len = doc.text().len(), delivered, "Text updated");
        Ok(())
    }

    /// Take the lock for `caller` and broadcast the result.
    ///
    /// An idempotent re-acquire by the holder still broadcasts; the
    /// snapshot is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::MissingIdentifier`] or [`LockError::Denied`].
    pub async fn acquire(&self, caller: &str) -> Result<(), LockError> {
        let mut doc = self.document.lock().await;
        doc.acquire(caller)?;
        let delivered = self.publish(&doc);
        info!(holder = caller, delivered, "Lock acquired");
        Ok(())
    }

    /// Release the lock held by `caller` and broadcast the result.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::MissingIdentifier`] or [`LockError::NotOwner`].
    pub async fn release(&self, caller: &str) -> Result<(), LockError> {
        let mut doc = self.document.lock().await;
        doc.release(caller)?;
        let delivered = self.publish(&doc);
        info!(previous_holder = caller, delivered, "Lock released");
        Ok(())
    }

    /// Open a session whose first event is the current snapshot.
    pub async fn subscribe(&self) -> SubscriptionSession {
        let doc = self.document.lock().await;
        let session = SubscriptionSession::open(
            Arc::clone(&self.registry),
            self.buffer_capacity,
            &doc.snapshot(),
        );
        info!(
            subscriber = %session.id(),
            total = self.registry.len(),
            "Subscriber connected"
        );
        session
    }

    /// End every open session, e.g. on process shutdown.
    ///
    /// Sessions observe the end of their stream and close themselves.
    pub fn disconnect_all(&self) -> usize {
        let removed = self.registry.clear();
        info!(removed, "All subscribers disconnected");
        removed
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    fn publish(&self, doc: &Document) -> usize {
        self.registry.broadcast(&doc.snapshot())
    }
}
