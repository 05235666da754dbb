//! GitHub API client for repository webhook management.
//!
//! This module provides the [`GitHubClient`] trait, the narrow set of REST
//! operations the repo-sync services consume, and [`RestGitHubClient`], the
//! reqwest-backed implementation of it. Callers depend on the trait so that
//! reconciliation and dispatch logic can be exercised without a network.
//!
//! No retries are performed here. Every error is surfaced to the caller, which
//! owns any backoff policy. Dropping a returned future aborts the in-flight
//! request.

mod hooks;
mod pagination;
mod pull_request;
mod repository;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;

pub use hooks::WebhookConfig;
pub use pagination::next_page_url;
pub use pull_request::PullRequestFile;
pub use repository::{Commit, CommitAuthor, CommitDetails};

/// Configuration for GitHub API client behavior.
///
/// # Examples
///
/// ```
/// use github_webhook_sdk::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_github_api_url("https://github.example.com/api/v3");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests (required by GitHub)
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// GitHub API base URL
    pub github_api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "github-webhook-sdk/0.1.0".to_string(),
            timeout: Duration::from_secs(30),
            github_api_url: "https://api.github.com".to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into();
        self
    }
}

/// Operations against the GitHub REST API consumed by repo-sync.
///
/// Every operation is scoped by `owner` and `repo`. Implementations own no
/// state beyond their transport and must report a missing resource as
/// [`ApiError::NotFound`], since callers branch on that distinction.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Create a repository webhook and return it as GitHub reports it.
    ///
    /// The returned config carries the assigned `id`. Its `secret` is empty.
    async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<WebhookConfig, ApiError>;

    /// List every webhook configured on the repository.
    async fn list_webhooks(&self, owner: &str, repo: &str)
        -> Result<Vec<WebhookConfig>, ApiError>;

    /// Fetch a repository webhook by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the webhook does not exist.
    async fn get_webhook(&self, owner: &str, repo: &str, id: i64)
        -> Result<WebhookConfig, ApiError>;

    /// Replace the attributes of the webhook identified by `config.id`.
    async fn edit_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<(), ApiError>;

    /// Delete a repository webhook.
    async fn delete_webhook(&self, owner: &str, repo: &str, id: i64) -> Result<(), ApiError>;

    /// Post a comment on a pull request.
    async fn create_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), ApiError>;

    /// List every file touched by a pull request.
    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ApiError>;

    /// List commits on `branch`, optionally restricted to those touching `path`.
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: Option<&str>,
    ) -> Result<Vec<Commit>, ApiError>;
}

/// GitHub REST API client authenticated with a bearer token.
///
/// # Examples
///
/// ```no_run
/// # use github_webhook_sdk::client::{ClientConfig, RestGitHubClient};
/// # fn example() -> Result<(), github_webhook_sdk::ApiError> {
/// let client = RestGitHubClient::builder()
///     .config(ClientConfig::default())
///     .token("ghp_example")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestGitHubClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    token: String,
}

impl RestGitHubClient {
    /// Create a new builder for constructing a REST client.
    pub fn builder() -> RestGitHubClientBuilder {
        RestGitHubClientBuilder::default()
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.github_api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::HttpClientError(e)
            }
        })
    }

    /// Make an authenticated GET request to the GitHub API.
    pub(crate) async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(method = "GET", url = %url, "Sending GitHub API request");
        self.send(self.request(reqwest::Method::GET, &url)).await
    }

    /// Make an authenticated POST request to the GitHub API.
    pub(crate) async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "Sending GitHub API request");
        self.send(self.request(reqwest::Method::POST, &url).json(body))
            .await
    }

    /// Make an authenticated PATCH request to the GitHub API.
    pub(crate) async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(method = "PATCH", url = %url, "Sending GitHub API request");
        self.send(self.request(reqwest::Method::PATCH, &url).json(body))
            .await
    }

    /// Make an authenticated DELETE request to the GitHub API.
    pub(crate) async fn delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(method = "DELETE", url = %url, "Sending GitHub API request");
        self.send(self.request(reqwest::Method::DELETE, &url)).await
    }

    /// GET `path` and every page linked through `Link: rel="next"`.
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path));

        while let Some(url) = next.take() {
            debug!(method = "GET", url = %url, "Fetching GitHub API page");
            let response = self
                .send(self.request(reqwest::Method::GET, &url))
                .await?;
            let response = check_status(response).await?;

            let link = response
                .headers()
                .get("Link")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            let page: Vec<T> = response.json().await?;
            items.extend(page);

            next = next_page_url(link.as_deref());
        }

        Ok(items)
    }
}

#[async_trait]
impl GitHubClient for RestGitHubClient {
    async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<WebhookConfig, ApiError> {
        RestGitHubClient::create_webhook(self, owner, repo, config).await
    }

    async fn list_webhooks(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<WebhookConfig>, ApiError> {
        RestGitHubClient::list_webhooks(self, owner, repo).await
    }

    async fn get_webhook(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
    ) -> Result<WebhookConfig, ApiError> {
        RestGitHubClient::get_webhook(self, owner, repo, id).await
    }

    async fn edit_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<(), ApiError> {
        RestGitHubClient::edit_webhook(self, owner, repo, config).await
    }

    async fn delete_webhook(&self, owner: &str, repo: &str, id: i64) -> Result<(), ApiError> {
        RestGitHubClient::delete_webhook(self, owner, repo, id).await
    }

    async fn create_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), ApiError> {
        RestGitHubClient::create_pull_request_comment(self, owner, repo, number, body).await
    }

    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ApiError> {
        RestGitHubClient::list_pull_request_files(self, owner, repo, number).await
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: Option<&str>,
    ) -> Result<Vec<Commit>, ApiError> {
        RestGitHubClient::list_commits(self, owner, repo, branch, path).await
    }
}

// The REST client must stay usable as `Arc<dyn GitHubClient>` from spawned tasks.
const _: fn() = || {
    fn shared_client<T: GitHubClient + 'static>() {}
    shared_client::<RestGitHubClient>();
    let _: fn(RestGitHubClient) -> std::sync::Arc<dyn GitHubClient> = |client| {
        std::sync::Arc::new(client)
    };
};

// Security: Don't expose the token in debug output
impl std::fmt::Debug for RestGitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGitHubClient")
            .field("config", &self.config)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Builder for `RestGitHubClient`.
#[derive(Default)]
pub struct RestGitHubClientBuilder {
    config: Option<ClientConfig>,
    token: Option<String>,
}

impl RestGitHubClientBuilder {
    /// Set the client configuration.
    ///
    /// If not set, uses `ClientConfig::default()`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the bearer token used for every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build the REST client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if no token was supplied or the HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<RestGitHubClient, ApiError> {
        let config = self.config.unwrap_or_default();

        let token = match self.token {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                return Err(ApiError::Configuration {
                    message: "GitHub token is required".to_string(),
                })
            }
        };

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(RestGitHubClient {
            http_client,
            config,
            token,
        })
    }
}

/// Map a non-success response onto the `ApiError` taxonomy.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(match status.as_u16() {
        422 => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Validation failed".to_string());
            ApiError::InvalidRequest { message }
        }
        404 => ApiError::NotFound,
        403 => ApiError::AuthorizationFailed,
        401 => ApiError::AuthenticationFailed,
        _ => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            ApiError::HttpError {
                status: status.as_u16(),
                message,
            }
        }
    })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
