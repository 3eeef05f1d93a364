//! The document snapshot pushed to every subscriber.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Full current state of the shared document.
///
/// Every snapshot is authoritative: consumers replace their local copy
/// with it rather than merging it. An unowned lock is represented by an
/// empty `lockHolder`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Current document text.
    pub text: String,
    /// Identifier of the client holding the write lock, or empty.
    pub lock_holder: String,
}

impl Snapshot {
    /// Whether some client currently holds the write lock.
    pub fn is_locked(&self) -> bool {
        !self.lock_holder.is_empty()
    }
}
