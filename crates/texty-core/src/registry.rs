//! Live subscriber set with non-blocking fan-out.
//!
//! The registry stores only the sending half of each subscriber's
//! channel. The receiving half lives in the
//! [`SubscriptionSession`](crate::session::SubscriptionSession), so a
//! dropped session is observed here as a closed channel on the next
//! send and never keeps a dead connection alive.
//!
//! Sends use [`mpsc::Sender::try_send`]: a broadcast never waits on a
//! slow subscriber. A subscriber whose buffer is full is evicted instead
//! of silently skipping an event, so every registered subscriber sees
//! every snapshot in order.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use texty_types::{Snapshot, SubscriberId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::TransportGone;

/// Sending handle for one subscription.
///
/// Dropping the handle closes the subscriber's stream.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    tx: mpsc::Sender<Snapshot>,
}

impl Subscriber {
    /// Create a subscriber handle and the receiver it feeds.
    ///
    /// `capacity` is clamped to at least one buffered snapshot.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Snapshot>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let subscriber = Self {
            id: SubscriberId::new(),
            tx,
        };
        (subscriber, rx)
    }

    /// The subscriber's identifier.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queue a snapshot without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TransportGone::Disconnected`] if the receiver is gone and
    /// [`TransportGone::Lagging`] if its buffer is full.
    pub fn send(&self, snapshot: &Snapshot) -> Result<(), TransportGone> {
        self.tx.try_send(snapshot.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportGone::Lagging(self.id),
            mpsc::error::TrySendError::Closed(_) => TransportGone::Disconnected(self.id),
        })
    }
}

/// Concurrent-safe set of live subscribers.
#[derive(Debug, Default)]
pub struct BroadcastRegistry {
    subscribers: Mutex<BTreeMap<SubscriberId, Subscriber>>,
}

impl BroadcastRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the guard cannot leave the map half-updated,
    // so a poisoned lock is still safe to use.
    fn members(&self) -> MutexGuard<'_, BTreeMap<SubscriberId, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a subscriber to the live set.
    pub fn register(&self, subscriber: Subscriber) {
        let id = subscriber.id();
        let mut members = self.members();
        members.insert(id, subscriber);
        debug!(subscriber = %id, total = members.len(), "Subscriber registered");
    }

    /// Remove a subscriber, dropping its sending handle.
    ///
    /// Returns `false` if it was already gone; removing twice is not an
    /// error.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut members = self.members();
        let removed = members.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, remaining = members.len(), "Subscriber unregistered");
        }
        removed
    }

    /// Send `snapshot` to every registered subscriber.
    ///
    /// Subscribers that cannot take the snapshot are removed; delivery to
    /// the rest continues. Returns the number of subscribers that
    /// received it.
    pub fn broadcast(&self, snapshot: &Snapshot) -> usize {
        let mut members = self.members();

        let gone: Vec<TransportGone> = members
            .values()
            .filter_map(|subscriber| subscriber.send(snapshot).err())
            .collect();

        for failure in &gone {
            match failure {
                TransportGone::Disconnected(id) => {
                    debug!(subscriber = %id, "Dropping disconnected subscriber");
                    members.remove(id);
                }
                TransportGone::Lagging(id) => {
                    warn!(subscriber = %id, "Evicting subscriber that fell behind");
                    members.remove(id);
                }
            }
        }

        let delivered = members.len();
        debug!(delivered, evicted = gone.len(), "Broadcast snapshot");
        delivered
    }

    /// Remove every subscriber, ending all of their streams.
    ///
    /// Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut members = self.members();
        let removed = members.len();
        members.clear();
        debug!(removed, "Registry cleared");
        removed
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.members().len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: SubscriberId) -> bool {
        self.members().contains_key(&id)
    }
}
