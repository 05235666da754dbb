//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use repo_sync_core::webhook::{ConfigurationError, ReconcileError, WebhookError};
use repo_sync_core::{JobQueueError, SecretError, StoreError};
use tracing::{error, warn};

/// Handler errors with HTTP status code mapping
///
/// - `400 Bad Request`: the delivery or request is malformed, misdirected or
///   names a repository whose configuration cannot be reconciled
/// - `401 Unauthorized`: the delivery signature does not verify
/// - `404 Not Found`: the repository does not exist
/// - `502 Bad Gateway`: the GitHub API rejected or failed a reconciliation call
/// - `500`/`503`: storage or queue failures
///
/// Messages for server-side failures are replaced with a generic message; the
/// details are logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiHandlerError {
    /// Missing or unreadable required headers
    #[error("Invalid headers: {message}")]
    InvalidHeaders { message: String },

    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    /// Delivery rejected by verification or dispatch
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// Repository configuration cannot be used for webhook handling
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Remote webhook reconciliation failed
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("Secret storage failure: {0}")]
    Secret(#[from] SecretError),

    #[error("Job queue failure: {0}")]
    Queue(#[from] JobQueueError),
}

impl ApiHandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidHeaders { .. } => StatusCode::BAD_REQUEST,
            Self::RepositoryNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Webhook(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::Configuration(_) => StatusCode::BAD_REQUEST,
            Self::Reconcile(_) => StatusCode::BAD_GATEWAY,
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Secret(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match status {
            StatusCode::BAD_GATEWAY => {
                error!(error = %self, "GitHub API call failed");
                self.to_string()
            }
            s if s.is_server_error() => {
                // Log detailed error server-side but return generic message to client
                error!(error = %self, "Internal server error occurred");
                "Internal server error occurred. Please try again later.".to_string()
            }
            _ => {
                warn!(error = %self, status = status.as_u16(), "Request rejected");
                self.to_string()
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
