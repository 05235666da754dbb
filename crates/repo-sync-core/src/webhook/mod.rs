//! # Webhook Module
//!
//! Inbound delivery handling and remote webhook reconciliation for one
//! repository.
//!
//! Deliveries flow through signature verification into [`parse_webhook`],
//! which yields a [`WebhookResponse`]. A response is an outcome, not an error:
//! ignored branches, disabled sync and unsupported events are all successful
//! responses without a job. Only malformed or misdirected deliveries are
//! [`WebhookError`]s.

use bytes::Bytes;
use github_webhook_sdk::SignatureError;
use serde::Serialize;

use crate::jobs::JobSpec;

mod dispatch;
mod events;
mod reconcile;
mod repository;

pub use dispatch::{parse_webhook, DispatchContext};
pub use events::{BranchRef, EventRepository, PullRequestEvent, PullRequestPayload, PushEvent};
pub use reconcile::ReconcileError;
pub use repository::{parse_owner_repo, ConfigurationError, WebhookRepository};

/// Events every managed webhook subscribes to.
pub const SUBSCRIBED_EVENTS: [&str; 2] = ["push", "pull_request"];

/// Content type every managed webhook is configured with.
pub const CONTENT_TYPE: &str = "json";

pub(crate) fn subscribed_events() -> Vec<String> {
    SUBSCRIBED_EVENTS.iter().map(|e| e.to_string()).collect()
}

/// An inbound webhook delivery, reduced to what validation and dispatch need.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// `X-GitHub-Event` header value
    pub event_type: String,

    /// `X-Hub-Signature-256` header value, if present
    pub signature: Option<String>,

    /// Raw request body exactly as received
    pub body: Bytes,
}

/// Outcome of dispatching a delivery.
///
/// `job == None` means there is no work to schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookResponse {
    /// HTTP status to answer the delivery with
    pub code: u16,

    /// Informational message; not a wire contract
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSpec>,
}

impl WebhookResponse {
    /// 200 with no job.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            job: None,
        }
    }

    /// 202 with a job to schedule.
    pub fn accepted(message: impl Into<String>, job: JobSpec) -> Self {
        Self {
            code: 202,
            message: message.into(),
            job: Some(job),
        }
    }

    /// 501 for events this service does not handle.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self {
            code: 501,
            message: message.into(),
            job: None,
        }
    }
}

/// Delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The repository has no webhook, so there is no secret to verify against.
    #[error("unexpected webhook request")]
    UnexpectedRequest,

    #[error("invalid signature")]
    InvalidSignature(#[source] SignatureError),

    #[error("missing repository in {event} event")]
    MissingRepository { event: &'static str },

    #[error("repository mismatch")]
    RepositoryMismatch,

    #[error("missing GitHub config")]
    MissingGitHubConfig,

    #[error("expected PR in event")]
    MissingPullRequest,

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl WebhookError {
    /// HTTP status a delivery failing with this error is answered with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidSignature(_) => 401,
            Self::UnexpectedRequest
            | Self::MissingRepository { .. }
            | Self::RepositoryMismatch
            | Self::MissingGitHubConfig
            | Self::MissingPullRequest
            | Self::InvalidPayload(_) => 400,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
