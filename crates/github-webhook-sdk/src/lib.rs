//! # GitHub Webhook SDK
//!
//! Thin GitHub REST API access and webhook signature validation used by the
//! repo-sync services.
//!
//! This SDK provides:
//! - The [`GitHubClient`] trait, the seam every caller depends on
//! - [`RestGitHubClient`], a reqwest-backed implementation of that trait
//! - HMAC-SHA256 validation of `X-Hub-Signature-256` headers
//! - Link-header pagination helpers
//!
//! # Examples
//!
//! ## Validating a delivery
//!
//! ```rust
//! use github_webhook_sdk::webhook::SignatureValidator;
//!
//! let validator = SignatureValidator::new("webhook-secret");
//! let payload = br#"{"zen":"Keep it logically awesome."}"#;
//! let signature = validator.sign(payload)?;
//!
//! assert!(validator.validate(payload, Some(&signature)).is_ok());
//! # Ok::<(), github_webhook_sdk::SignatureError>(())
//! ```
//!
//! ## Managing a repository webhook
//!
//! ```rust,no_run
//! use github_webhook_sdk::client::{ClientConfig, GitHubClient, RestGitHubClient, WebhookConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RestGitHubClient::builder()
//!     .config(ClientConfig::default())
//!     .token("ghp_example")
//!     .build()?;
//!
//! let hook = client
//!     .create_webhook(
//!         "grafana",
//!         "git-ui-sync-demo",
//!         WebhookConfig {
//!             url: "https://example.com/webhooks/demo".to_string(),
//!             content_type: "json".to_string(),
//!             active: true,
//!             events: vec!["push".to_string(), "pull_request".to_string()],
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! println!("created webhook {}", hook.id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod webhook;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{
    ClientConfig, Commit, GitHubClient, PullRequestFile, RestGitHubClient, WebhookConfig,
};
pub use error::{ApiError, SignatureError};
pub use webhook::SignatureValidator;
