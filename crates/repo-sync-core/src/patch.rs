//! JSON-Patch style operations returned by reconciliation.
//!
//! Reconciliation reports state changes instead of writing them. Exactly two
//! paths are ever produced: [`WEBHOOK_STATUS_PATH`] followed by
//! [`WEBHOOK_SECRET_PATH`].

use serde::{Deserialize, Serialize};

use crate::model::WebhookStatus;
use crate::secrets::SecureValue;

/// Path of the reconciled webhook status on a repository.
pub const WEBHOOK_STATUS_PATH: &str = "/status/webhook";

/// Path of the webhook secret on a repository.
pub const WEBHOOK_SECRET_PATH: &str = "/secure/webhookSecret";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Add,
    Remove,
    Replace,
}

/// Value carried by a patch operation.
///
/// Variants are tried in order when reading. `Secure` only matches a
/// single-key `create`/`name` object, so it must precede the more permissive
/// `WebhookStatus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    Secure(SecureValue),
    WebhookStatus(WebhookStatus),
    Json(serde_json::Value),
}

/// A single `{"op", "path", "value"}` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: PatchOperation,
    pub path: String,
    pub value: PatchValue,
}

impl PatchOp {
    /// Replace the reconciled webhook status.
    pub fn replace_webhook_status(status: WebhookStatus) -> Self {
        Self {
            op: PatchOperation::Replace,
            path: WEBHOOK_STATUS_PATH.to_string(),
            value: PatchValue::WebhookStatus(status),
        }
    }

    /// Replace the webhook secret.
    pub fn replace_webhook_secret(secret: SecureValue) -> Self {
        Self {
            op: PatchOperation::Replace,
            path: WEBHOOK_SECRET_PATH.to_string(),
            value: PatchValue::Secure(secret),
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
