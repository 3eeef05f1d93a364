//! Per-connection subscription lifecycle.
//!
//! A [`SubscriptionSession`] moves through `Connecting -> Active -> Closed`.
//! It is opened by the
//! [`LockCoordinator`](crate::coordinator::LockCoordinator) while the
//! document lock is held, so the initial snapshot and every later
//! broadcast arrive in commit order with nothing missed or repeated.
//!
//! Closing is idempotent and also runs on drop, so a transport that
//! simply drops the session on disconnect still frees its registry slot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use texty_types::{Snapshot, SubscriberId};
use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::{BroadcastRegistry, Subscriber};

/// Lifecycle state of a [`SubscriptionSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet registered.
    Connecting,
    /// Registered and receiving snapshots.
    Active,
    /// Unregistered; yields no further snapshots.
    Closed,
}

/// One live stream of document snapshots.
#[derive(Debug)]
pub struct SubscriptionSession {
    id: SubscriberId,
    rx: mpsc::Receiver<Snapshot>,
    registry: Arc<BroadcastRegistry>,
    state: SessionState,
}

impl SubscriptionSession {
    /// Register a new session and queue `initial` as its first event.
    ///
    /// Must be called while the document is locked so no broadcast can
    /// slip in between the snapshot and the registration.
    pub(crate) fn open(
        registry: Arc<BroadcastRegistry>,
        capacity: usize,
        initial: &Snapshot,
    ) -> Self {
        let (subscriber, rx) = Subscriber::channel(capacity);
        let mut session = Self {
            id: subscriber.id(),
            rx,
            registry,
            state: SessionState::Connecting,
        };

        // A fresh channel always has room for the first snapshot.
        if subscriber.send(initial).is_err() {
            session.close();
            return session;
        }

        session.registry.register(subscriber);
        session.state = SessionState::Active;
        session
    }

    /// The session's identifier.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the session is closed, either locally or
    /// because the registry evicted it.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        if self.state == SessionState::Closed {
            return None;
        }
        let next = self.rx.recv().await;
        if next.is_none() {
            self.close();
        }
        next
    }

    /// Unregister and release the receiving side.
    ///
    /// Calling this more than once has no further effect.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.registry.unregister(self.id);
        self.rx.close();
        self.state = SessionState::Closed;
        debug!(
            subscriber = %self.id,
            remaining = self.registry.len(),
            "Subscription closed"
        );
    }
}

impl Stream for SubscriptionSession {
    type Item = Snapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state == SessionState::Closed {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(None) => {
                this.close();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl Drop for SubscriptionSession {
    fn drop(&mut self) {
        self.close();
    }
}
