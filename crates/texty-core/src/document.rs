//! The shared document and its lock policy.
//!
//! [`Document`] is a plain state machine with no synchronization of its
//! own. The [`LockCoordinator`](crate::coordinator::LockCoordinator) owns
//! the only instance and serializes every call against it.

use texty_types::Snapshot;

use crate::error::LockError;

/// One shared text document plus the identifier of its lock holder.
///
/// Invariant: `lock_holder` is either `None` or a non-empty client
/// identifier, and `text` only changes through a [`write`](Self::write)
/// by that identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    lock_holder: Option<String>,
}

impl Document {
    /// Create an empty, unlocked document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Identifier of the current lock holder, if any.
    pub fn lock_holder(&self) -> Option<&str> {
        self.lock_holder.as_deref()
    }

    /// Copy the current state into a wire snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            lock_holder: self.lock_holder.clone().unwrap_or_default(),
        }
    }

    fn is_held_by(&self, caller: &str) -> bool {
        !caller.is_empty() && self.lock_holder.as_deref() == Some(caller)
    }

    /// Replace the text on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Forbidden`] unless `caller` is non-empty and
    /// holds the lock. An unlocked document cannot be written.
    pub fn write(&mut self, caller: &str, text: String) -> Result<(), LockError> {
        if !self.is_held_by(caller) {
            return Err(LockError::Forbidden);
        }
        self.text = text;
        Ok(())
    }

    /// Take the lock for `caller`.
    ///
    /// Re-acquiring a lock the caller already holds succeeds and leaves
    /// the holder unchanged, so a client can retry safely.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::MissingIdentifier`] for an empty `caller` and
    /// [`LockError::Denied`] when another client holds the lock.
    pub fn acquire(&mut self, caller: &str) -> Result<(), LockError> {
        if caller.is_empty() {
            return Err(LockError::MissingIdentifier);
        }
        match self.lock_holder.as_deref() {
            Some(holder) if holder != caller => Err(LockError::Denied),
            Some(_) => Ok(()),
            None => {
                self.lock_holder = Some(caller.to_owned());
                Ok(())
            }
        }
    }

    /// Give up the lock held by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::MissingIdentifier`] for an empty `caller` and
    /// [`LockError::NotOwner`] when `caller` does not hold the lock.
    pub fn release(&mut self, caller: &str) -> Result<(), LockError> {
        if caller.is_empty() {
            return Err(LockError::MissingIdentifier);
        }
        if !self.is_held_by(caller) {
            return Err(LockError::NotOwner);
        }
        self.lock_holder = None;
        Ok(())
    }
}
