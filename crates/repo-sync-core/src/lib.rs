//! # Repo-Sync Core
//!
//! Core business logic for keeping a GitHub repository webhook in step with a
//! repository definition and for turning inbound webhook deliveries into sync
//! jobs.
//!
//! ## Architecture
//!
//! - [`webhook::parse_webhook`] maps an event type and payload to a
//!   [`webhook::WebhookResponse`], applying repository, branch and sync rules
//! - [`webhook::WebhookRepository`] verifies deliveries and reconciles the
//!   remote webhook through an injected [`github_webhook_sdk::GitHubClient`]
//! - Reconciliation never persists anything itself; it returns [`PatchOp`]s
//!   for a [`RepositoryStore`] to apply
//! - Storage, secrets and job hand-off are traits with in-memory
//!   implementations
//!
//! ## Usage
//!
//! ```rust
//! use repo_sync_core::webhook::{parse_webhook, DispatchContext};
//! use repo_sync_core::{GitHubRepositoryConfig, JobAction};
//!
//! let github = GitHubRepositoryConfig {
//!     url: "https://github.com/grafana/grafana".to_string(),
//!     branch: "main".to_string(),
//!     generate_dashboard_previews: false,
//! };
//! let context = DispatchContext {
//!     repository: "grafana",
//!     full_name: "grafana/grafana",
//!     github: Some(&github),
//!     sync_enabled: true,
//! };
//!
//! let payload = br#"{"ref":"refs/heads/main","repository":{"full_name":"grafana/grafana"}}"#;
//! let response = parse_webhook("push", payload, &context).unwrap();
//!
//! assert_eq!(response.code, 202);
//! assert!(matches!(
//!     response.job.map(|job| job.action),
//!     Some(JobAction::Pull { .. })
//! ));
//! ```

pub mod jobs;
pub mod model;
pub mod patch;
pub mod secrets;
pub mod store;
pub mod webhook;

pub use jobs::{
    InMemoryJobQueue, JobAction, JobQueue, JobQueueError, JobSpec, PullRequestJobOptions,
    SyncJobOptions,
};
pub use model::{
    GitHubRepositoryConfig, Repository, RepositorySpec, RepositoryStatus, SecureValues,
    SyncOptions, WebhookStatus,
};
pub use patch::{PatchOp, PatchOperation, PatchValue, WEBHOOK_SECRET_PATH, WEBHOOK_STATUS_PATH};
pub use secrets::{
    resolve_webhook_secret, webhook_secret_name, InMemorySecretStore, SecretError, SecretStore,
    SecretValue, SecureValue,
};
pub use store::{InMemoryRepositoryStore, RepositoryStore, StoreError};
