//! Per-repository webhook façade.

use github_webhook_sdk::{ApiError, GitHubClient, SignatureValidator};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::reconcile::{ReconcileError, Reconciler};
use super::{parse_webhook, DispatchContext, WebhookError, WebhookRequest, WebhookResponse};
use crate::model::Repository;
use crate::patch::PatchOp;
use crate::secrets::SecretValue;

/// Reasons a [`WebhookRepository`] cannot be built for a repository.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing GitHub config")]
    MissingGitHubConfig,

    #[error("invalid GitHub repository URL: {url}")]
    InvalidRepositoryUrl { url: String },
}

/// Extract `(owner, repo)` from a GitHub repository URL.
///
/// Accepts `https://github.com/{owner}/{repo}` with an optional `.git`
/// suffix or trailing slash. Extra path segments after the repository name
/// are ignored.
pub fn parse_owner_repo(repository_url: &str) -> Result<(String, String), ConfigurationError> {
    let invalid = || ConfigurationError::InvalidRepositoryUrl {
        url: repository_url.to_string(),
    };

    let parsed = url::Url::parse(repository_url).map_err(|_| invalid())?;
    let mut segments = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty());

    let owner = segments.next().ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok((owner.to_string(), repo.to_string()))
}

/// Everything webhook-related for one repository.
///
/// Verifies and dispatches deliveries, comments on pull requests, and
/// reconciles the remote webhook. Holds a snapshot of the repository taken at
/// construction; reconciliation results are returned as patch operations and
/// never applied here.
pub struct WebhookRepository {
    repository: Repository,
    owner: String,
    repo: String,
    full_name: String,
    webhook_url: String,
    github: Arc<dyn GitHubClient>,
    secret: Option<SecretValue>,
}

impl std::fmt::Debug for WebhookRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookRepository")
            .field("repository", &self.repository.name)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("webhook_url", &self.webhook_url)
            .field("secret", &self.secret)
            .finish()
    }
}

impl WebhookRepository {
    /// Build the façade, deriving owner and repo from the repository's GitHub URL.
    ///
    /// An empty `webhook_url` disables reconciliation: every `on_*` call
    /// becomes a no-op.
    pub fn new(
        repository: Repository,
        webhook_url: impl Into<String>,
        github: Arc<dyn GitHubClient>,
        secret: Option<SecretValue>,
    ) -> Result<Self, ConfigurationError> {
        let config = repository
            .spec
            .github
            .as_ref()
            .ok_or(ConfigurationError::MissingGitHubConfig)?;
        let (owner, repo) = parse_owner_repo(&config.url)?;

        Ok(Self::with_coordinates(
            repository,
            owner,
            repo,
            webhook_url,
            github,
            secret,
        ))
    }

    /// Build the façade with explicit owner and repo.
    pub fn with_coordinates(
        repository: Repository,
        owner: impl Into<String>,
        repo: impl Into<String>,
        webhook_url: impl Into<String>,
        github: Arc<dyn GitHubClient>,
        secret: Option<SecretValue>,
    ) -> Self {
        let owner = owner.into();
        let repo = repo.into();
        let full_name = format!("{}/{}", owner, repo);

        Self {
            repository,
            owner,
            repo,
            full_name,
            webhook_url: webhook_url.into(),
            github,
            secret,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    fn reconciler(&self) -> Reconciler<'_> {
        Reconciler {
            client: self.github.as_ref(),
            owner: &self.owner,
            repo: &self.repo,
            webhook_url: &self.webhook_url,
        }
    }

    /// Verify a delivery's signature and dispatch it.
    ///
    /// A repository without a reconciled webhook, or without a secret to
    /// verify against, rejects every delivery as unexpected.
    #[instrument(
        skip(self, request),
        fields(repository = %self.repository.name, event = %request.event_type)
    )]
    pub async fn webhook(&self, request: &WebhookRequest) -> Result<WebhookResponse, WebhookError> {
        if self.repository.status.webhook.is_none() {
            warn!("Delivery received for repository without a webhook");
            return Err(WebhookError::UnexpectedRequest);
        }
        let secret = self.secret.as_ref().ok_or_else(|| {
            warn!("Delivery received for repository without a webhook secret");
            WebhookError::UnexpectedRequest
        })?;

        SignatureValidator::new(secret.expose_secret())
            .validate(&request.body, request.signature.as_deref())
            .map_err(WebhookError::InvalidSignature)?;

        let context = DispatchContext {
            repository: &self.repository.name,
            full_name: &self.full_name,
            github: self.repository.spec.github.as_ref(),
            sync_enabled: self.repository.spec.sync.enabled,
        };
        parse_webhook(&request.event_type, &request.body, &context)
    }

    /// Post a comment on a pull request of this repository.
    #[instrument(skip(self, body), fields(repository = %self.repository.name))]
    pub async fn comment_pull_request(&self, number: u64, body: &str) -> Result<(), ApiError> {
        self.github
            .create_pull_request_comment(&self.owner, &self.repo, number, body)
            .await?;
        info!(pr = number, "Commented on pull request");
        Ok(())
    }

    /// Reconcile after the repository was created.
    pub async fn on_create(&self) -> Result<Vec<PatchOp>, ReconcileError> {
        self.reconciler().create().await
    }

    /// Take over webhooks left on GitHub for this delivery URL.
    ///
    /// For a repository the store does not know yet, e.g. after a restart with
    /// a fresh store. Returns `None` when there is nothing to adopt and
    /// [`on_create`](Self::on_create) should run instead.
    pub async fn adopt_existing(&self) -> Result<Option<Vec<PatchOp>>, ReconcileError> {
        self.reconciler().adopt().await
    }

    /// Reconcile after the repository was updated.
    pub async fn on_update(&self) -> Result<Vec<PatchOp>, ReconcileError> {
        self.reconciler()
            .update(self.repository.status.webhook.as_ref())
            .await
    }

    /// Remove the remote webhook before the repository is deleted.
    pub async fn on_delete(&self) -> Result<(), ReconcileError> {
        self.reconciler()
            .delete(self.repository.status.webhook.as_ref())
            .await
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
