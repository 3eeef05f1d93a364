//! Request and response bodies for the text and lock operations.
//!
//! Every field is optional on the wire. A missing `userId` or `text`
//! deserializes to the empty string, which the lock policy then treats
//! as "no identifier" or "empty document" respectively.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Body of a `set-text` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "bindings/")]
pub struct TextUpdate {
    /// Identifier of the calling client.
    pub user_id: String,
    /// Replacement document text.
    pub text: String,
}

/// Body of an `acquire-lock` or `release-lock` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "bindings/")]
pub struct LockRequest {
    /// Identifier of the calling client.
    pub user_id: String,
}

/// Acknowledgement returned by every successful mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ack {
    /// Always `true` for a successful operation.
    pub success: bool,
}

impl Ack {
    /// The acknowledgement for a successful operation.
    pub const OK: Self = Self { success: true };
}
