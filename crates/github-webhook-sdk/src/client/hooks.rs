//! Repository webhook operations for GitHub API.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::{check_status, RestGitHubClient};
use crate::error::ApiError;

/// A repository webhook as GitHub represents it.
///
/// `id == 0` means the webhook has not been created yet. `secret` is
/// write-only: GitHub never returns it, so it is always empty on configs
/// read back from the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub id: i64,
    pub events: Vec<String>,
    pub active: bool,
    pub url: String,
    pub content_type: String,
    pub secret: String,
}

/// Request body for creating or editing a hook.
#[derive(Debug, Serialize)]
struct HookRequest {
    name: &'static str,
    active: bool,
    events: Vec<String>,
    config: HookRequestConfig,
}

#[derive(Debug, Serialize)]
struct HookRequestConfig {
    url: String,
    content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
}

impl From<&WebhookConfig> for HookRequest {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            name: "web",
            active: config.active,
            events: config.events.clone(),
            config: HookRequestConfig {
                url: config.url.clone(),
                content_type: config.content_type.clone(),
                secret: (!config.secret.is_empty()).then(|| config.secret.clone()),
            },
        }
    }
}

/// Hook as returned by the API.
#[derive(Debug, Deserialize)]
struct Hook {
    id: i64,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    events: Vec<String>,
    #[serde(default)]
    config: HookResponseConfig,
}

#[derive(Debug, Default, Deserialize)]
struct HookResponseConfig {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content_type: String,
}

impl From<Hook> for WebhookConfig {
    fn from(hook: Hook) -> Self {
        Self {
            id: hook.id,
            events: hook.events,
            active: hook.active,
            url: hook.config.url,
            content_type: hook.config.content_type,
            secret: String::new(),
        }
    }
}

impl RestGitHubClient {
    // ========================================================================
    // Webhook Operations
    // ========================================================================

    /// Create a repository webhook.
    #[instrument(skip(self, config), fields(url = %config.url))]
    pub async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<WebhookConfig, ApiError> {
        let path = format!("/repos/{}/{}/hooks", owner, repo);
        let response = self.post(&path, &HookRequest::from(&config)).await?;
        let response = check_status(response).await?;

        let hook: Hook = response.json().await?;
        Ok(hook.into())
    }

    /// List every webhook on a repository, across all pages.
    #[instrument(skip(self))]
    pub async fn list_webhooks(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<WebhookConfig>, ApiError> {
        let path = format!("/repos/{}/{}/hooks?per_page=100", owner, repo);
        let hooks: Vec<Hook> = self.get_all_pages(&path).await?;
        Ok(hooks.into_iter().map(WebhookConfig::from).collect())
    }

    /// Get a repository webhook by ID.
    #[instrument(skip(self))]
    pub async fn get_webhook(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
    ) -> Result<WebhookConfig, ApiError> {
        let path = format!("/repos/{}/{}/hooks/{}", owner, repo, id);
        let response = self.get(&path).await?;
        let response = check_status(response).await?;

        let hook: Hook = response.json().await?;
        Ok(hook.into())
    }

    /// Replace the attributes of an existing webhook.
    #[instrument(skip(self, config), fields(id = config.id, url = %config.url))]
    pub async fn edit_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<(), ApiError> {
        let path = format!("/repos/{}/{}/hooks/{}", owner, repo, config.id);
        let response = self.patch(&path, &HookRequest::from(&config)).await?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete a repository webhook.
    #[instrument(skip(self))]
    pub async fn delete_webhook(&self, owner: &str, repo: &str, id: i64) -> Result<(), ApiError> {
        let path = format!("/repos/{}/{}/hooks/{}", owner, repo, id);
        let response = self.delete(&path).await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
