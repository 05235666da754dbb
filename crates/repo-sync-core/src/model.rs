//! Repository resource model.
//!
//! A [`Repository`] is the unit everything else is scoped to: its spec says
//! which GitHub repository and branch to track, its status records the last
//! reconciled webhook, and its secure values hold references to secrets.

use serde::{Deserialize, Serialize};

use crate::secrets::SecureValue;

/// A repository definition together with its reconciled state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Unique name; also the last path segment of the delivery URL
    pub name: String,

    pub spec: RepositorySpec,

    #[serde(default)]
    pub status: RepositoryStatus,

    #[serde(default)]
    pub secure: SecureValues,
}

impl Repository {
    /// Create a repository with the given spec and empty status.
    pub fn new(name: impl Into<String>, spec: RepositorySpec) -> Self {
        Self {
            name: name.into(),
            spec,
            status: RepositoryStatus::default(),
            secure: SecureValues::default(),
        }
    }
}

/// Desired configuration of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubRepositoryConfig>,

    #[serde(default)]
    pub sync: SyncOptions,
}

/// GitHub coordinates of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepositoryConfig {
    /// Repository URL, e.g. `https://github.com/grafana/grafana`
    #[serde(default)]
    pub url: String,

    /// Tracked branch
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Post dashboard preview links on pull requests
    #[serde(default)]
    pub generate_dashboard_previews: bool,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for GitHubRepositoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            branch: default_branch(),
            generate_dashboard_previews: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub enabled: bool,
}

/// Observed state of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookStatus>,
}

/// Last reconciled state of the remote webhook.
///
/// An `id` of zero means the webhook has never been created remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookStatus {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub subscribed_events: Vec<String>,
}

/// Secret-bearing fields of a repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<SecureValue>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
