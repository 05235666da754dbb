//! Remote webhook reconciliation.
//!
//! Reconciliation compares the desired webhook (delivery URL plus
//! [`SUBSCRIBED_EVENTS`](super::SUBSCRIBED_EVENTS)) against the webhook GitHub
//! reports and the status last persisted on the repository. Every remote
//! mutation yields exactly two patch operations, the new status followed by
//! the new secret. A remote webhook that already matches yields none.

use github_webhook_sdk::{ApiError, GitHubClient, WebhookConfig};
use tracing::{debug, info, instrument};

use super::{subscribed_events, CONTENT_TYPE};
use crate::model::WebhookStatus;
use crate::patch::PatchOp;
use crate::secrets::{SecretValue, SecureValue};

/// Remote webhook reconciliation failures.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    CreateWebhook(ApiError),

    #[error("list webhooks: {0}")]
    ListWebhooks(#[source] ApiError),

    #[error("get webhook: {0}")]
    GetWebhook(#[source] ApiError),

    #[error("edit webhook: {0}")]
    EditWebhook(#[source] ApiError),

    #[error("delete webhook: {0}")]
    DeleteWebhook(#[source] ApiError),
}

impl ReconcileError {
    /// The GitHub API failure behind this error.
    pub fn api_error(&self) -> &ApiError {
        match self {
            Self::CreateWebhook(e)
            | Self::ListWebhooks(e)
            | Self::GetWebhook(e)
            | Self::EditWebhook(e)
            | Self::DeleteWebhook(e) => e,
        }
    }
}

/// Reconciles one repository's webhook against GitHub.
pub(crate) struct Reconciler<'a> {
    pub client: &'a dyn GitHubClient,
    pub owner: &'a str,
    pub repo: &'a str,
    /// Desired delivery URL; empty disables reconciliation
    pub webhook_url: &'a str,
}

impl Reconciler<'_> {
    fn enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    fn desired(&self, id: i64, secret: &SecretValue) -> WebhookConfig {
        WebhookConfig {
            id,
            events: subscribed_events(),
            active: true,
            url: self.webhook_url.to_string(),
            content_type: CONTENT_TYPE.to_string(),
            secret: secret.expose_secret().to_string(),
        }
    }

    fn matches(&self, remote: &WebhookConfig) -> bool {
        let mut remote_events = remote.events.clone();
        remote_events.sort();
        let mut desired_events = subscribed_events();
        desired_events.sort();

        remote.url == self.webhook_url && remote_events == desired_events
    }

    fn patch_ops(status: WebhookStatus, secret: SecretValue) -> Vec<PatchOp> {
        vec![
            PatchOp::replace_webhook_status(status),
            PatchOp::replace_webhook_secret(SecureValue::Create(secret)),
        ]
    }

    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    pub async fn create(&self) -> Result<Vec<PatchOp>, ReconcileError> {
        if !self.enabled() {
            debug!("No webhook URL configured, skipping webhook creation");
            return Ok(Vec::new());
        }

        let secret = SecretValue::generate();
        let created = self
            .client
            .create_webhook(self.owner, self.repo, self.desired(0, &secret))
            .await
            .map_err(ReconcileError::CreateWebhook)?;

        info!(webhook_id = created.id, url = %created.url, "Created webhook");

        let status = WebhookStatus {
            id: created.id,
            url: created.url,
            subscribed_events: subscribed_events(),
        };
        Ok(Self::patch_ops(status, secret))
    }

    /// Take over webhooks that already deliver to this repository's URL.
    ///
    /// Their secrets are unknown, so the first match is edited with a fresh
    /// secret and every further match is deleted. `None` means nothing matched.
    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    pub async fn adopt(&self) -> Result<Option<Vec<PatchOp>>, ReconcileError> {
        if !self.enabled() {
            return Ok(None);
        }

        let hooks = self
            .client
            .list_webhooks(self.owner, self.repo)
            .await
            .map_err(ReconcileError::ListWebhooks)?;
        let mut matching = hooks.iter().filter(|hook| hook.url == self.webhook_url);

        let Some(adopted) = matching.next() else {
            return Ok(None);
        };

        for duplicate in matching {
            self.client
                .delete_webhook(self.owner, self.repo, duplicate.id)
                .await
                .map_err(ReconcileError::DeleteWebhook)?;
            info!(webhook_id = duplicate.id, "Deleted duplicate webhook");
        }

        let secret = SecretValue::generate();
        self.client
            .edit_webhook(self.owner, self.repo, self.desired(adopted.id, &secret))
            .await
            .map_err(ReconcileError::EditWebhook)?;

        info!(webhook_id = adopted.id, url = %self.webhook_url, "Adopted existing webhook");

        let status = WebhookStatus {
            id: adopted.id,
            url: self.webhook_url.to_string(),
            subscribed_events: subscribed_events(),
        };
        Ok(Some(Self::patch_ops(status, secret)))
    }

    #[instrument(skip(self, current), fields(owner = %self.owner, repo = %self.repo))]
    pub async fn update(
        &self,
        current: Option<&WebhookStatus>,
    ) -> Result<Vec<PatchOp>, ReconcileError> {
        if !self.enabled() {
            debug!("No webhook URL configured, skipping webhook update");
            return Ok(Vec::new());
        }

        let id = match current {
            Some(status) if status.id != 0 => status.id,
            _ => return self.create().await,
        };

        let remote = match self.client.get_webhook(self.owner, self.repo, id).await {
            Ok(remote) => remote,
            Err(ApiError::NotFound) => {
                info!(webhook_id = id, "Webhook no longer exists, recreating");
                return self.create().await;
            }
            Err(e) => return Err(ReconcileError::GetWebhook(e)),
        };

        if self.matches(&remote) {
            debug!(webhook_id = id, "Webhook is up to date");
            return Ok(Vec::new());
        }

        let secret = SecretValue::generate();
        let desired = self.desired(id, &secret);
        self.client
            .edit_webhook(self.owner, self.repo, desired)
            .await
            .map_err(ReconcileError::EditWebhook)?;

        info!(webhook_id = id, url = %self.webhook_url, "Updated webhook");

        let status = WebhookStatus {
            id,
            url: self.webhook_url.to_string(),
            subscribed_events: subscribed_events(),
        };
        Ok(Self::patch_ops(status, secret))
    }

    #[instrument(skip(self, current), fields(owner = %self.owner, repo = %self.repo))]
    pub async fn delete(&self, current: Option<&WebhookStatus>) -> Result<(), ReconcileError> {
        let status = match current {
            Some(status) if self.enabled() => status,
            _ => {
                debug!("No webhook to delete");
                return Ok(());
            }
        };

        self.client
            .delete_webhook(self.owner, self.repo, status.id)
            .await
            .map_err(ReconcileError::DeleteWebhook)?;

        info!(webhook_id = status.id, "Deleted webhook");
        Ok(())
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
