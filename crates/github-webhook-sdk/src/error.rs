//! Error types for GitHub API access and webhook validation.
//!
//! Errors carry enough classification for callers to decide on retry policy;
//! this crate itself never retries.

use thiserror::Error;

/// Errors during GitHub API operations.
///
/// These errors represent failures when communicating with the GitHub API,
/// including HTTP errors and parsing failures. [`ApiError::NotFound`] is the
/// sentinel callers match on to distinguish a missing resource from every
/// other failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP error response from GitHub API.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// Request to GitHub API timed out.
    #[error("Request timeout")]
    Timeout,

    /// The request was invalid (client error).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Authentication to GitHub API failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Authorization check failed (insufficient permissions).
    #[error("Authorization failed")]
    AuthorizationFailed,

    /// The requested resource was not found.
    #[error("Resource not found")]
    NotFound,

    /// The client could not be configured or a request could not be built.
    #[error("Client configuration error: {message}")]
    Configuration { message: String },

    /// Failed to parse JSON response from GitHub API.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Transient conditions include:
    /// - Server errors (5xx)
    /// - Rate limiting (429)
    /// - Request timeouts
    /// - Network/transport errors
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout => true,
            Self::InvalidRequest { .. } => false,
            Self::AuthenticationFailed => false,
            Self::AuthorizationFailed => false,
            Self::NotFound => false,
            Self::Configuration { .. } => false,
            Self::JsonError(_) => false,
            Self::HttpClientError(_) => true,
        }
    }

    /// Check if this error is the "resource not found" sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Webhook signature validation failures.
///
/// Messages never include the secret or the expected digest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The `X-Hub-Signature-256` header was absent or empty.
    #[error("missing signature header")]
    MissingSignature,

    /// The header was present but not of the form `sha256=<hex>`.
    #[error("invalid signature format: {message}")]
    InvalidFormat { message: String },

    /// The computed digest does not match the supplied one.
    #[error("signature mismatch")]
    Mismatch,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
