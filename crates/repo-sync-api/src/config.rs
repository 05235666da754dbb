//! Configuration types for the HTTP service

use repo_sync_core::RepositorySpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::errors::ConfigError;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// GitHub API access
    pub github: GitHubConfig,

    /// Delivery URL settings for managed webhooks
    pub webhooks: WebhooksConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Repositories reconciled at startup
    pub repositories: Vec<RepositoryDefinition>,
}

impl ServiceConfig {
    /// Check the configuration for values the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be greater than zero".to_string(),
            });
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }

        if let Some(base) = &self.webhooks.public_base_url {
            let parsed = url::Url::parse(base).map_err(|e| ConfigError::Invalid {
                message: format!("webhooks.public_base_url '{}' is not a URL: {}", base, e),
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "webhooks.public_base_url '{}' must use http or https",
                        base
                    ),
                });
            }
        }

        let mut names = HashSet::new();
        for repository in &self.repositories {
            if repository.name.trim().is_empty() {
                return Err(ConfigError::Missing {
                    key: "repositories[].name".to_string(),
                });
            }
            if !names.insert(repository.name.as_str()) {
                return Err(ConfigError::Invalid {
                    message: format!("duplicate repository name '{}'", repository.name),
                });
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
            shutdown_timeout_seconds: 30,
            max_body_size: 25 * 1024 * 1024, // GitHub caps deliveries at 25MB
        }
    }
}

/// GitHub API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_url: String,

    /// Access token used for every API call
    pub token: Option<String>,

    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: format!("repo-sync/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .field("user_agent", &self.user_agent)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Managed webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhooksConfig {
    /// Publicly reachable base URL of this service. Without it no webhooks
    /// are created, edited or deleted.
    pub public_base_url: Option<String>,
}

impl WebhooksConfig {
    /// Delivery URL for a repository, or an empty string when webhooks are
    /// disabled.
    pub fn webhook_url(&self, repository: &str) -> String {
        match &self.public_base_url {
            Some(base) if !base.trim().is_empty() => {
                format!("{}/webhooks/{}", base.trim_end_matches('/'), repository)
            }
            _ => String::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// A repository defined in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDefinition {
    pub name: String,

    #[serde(default)]
    pub spec: RepositorySpec,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
