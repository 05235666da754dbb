//! Scripted [`GitHubClient`] double for tests.
//!
//! Each operation pops the next scripted result from its own queue; an
//! operation with nothing scripted fails with [`ApiError::Configuration`] so
//! an unexpected call surfaces as a test failure instead of a hang. Every call
//! is recorded in order and can be inspected with [`MockGitHubClient::calls`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::{Commit, GitHubClient, PullRequestFile, WebhookConfig};
use crate::error::ApiError;

/// A call received by [`MockGitHubClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateWebhook {
        owner: String,
        repo: String,
        config: WebhookConfig,
    },
    ListWebhooks {
        owner: String,
        repo: String,
    },
    GetWebhook {
        owner: String,
        repo: String,
        id: i64,
    },
    EditWebhook {
        owner: String,
        repo: String,
        config: WebhookConfig,
    },
    DeleteWebhook {
        owner: String,
        repo: String,
        id: i64,
    },
    CreatePullRequestComment {
        owner: String,
        repo: String,
        number: u64,
        body: String,
    },
    ListPullRequestFiles {
        owner: String,
        repo: String,
        number: u64,
    },
    ListCommits {
        owner: String,
        repo: String,
        branch: String,
        path: Option<String>,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<RecordedCall>,
    create_webhook: VecDeque<Result<WebhookConfig, ApiError>>,
    list_webhooks: VecDeque<Result<Vec<WebhookConfig>, ApiError>>,
    get_webhook: VecDeque<Result<WebhookConfig, ApiError>>,
    edit_webhook: VecDeque<Result<(), ApiError>>,
    delete_webhook: VecDeque<Result<(), ApiError>>,
    create_pull_request_comment: VecDeque<Result<(), ApiError>>,
    list_pull_request_files: VecDeque<Result<Vec<PullRequestFile>, ApiError>>,
    list_commits: VecDeque<Result<Vec<Commit>, ApiError>>,
}

/// In-memory GitHub client with scripted responses.
#[derive(Default)]
pub struct MockGitHubClient {
    state: Mutex<State>,
}

fn unscripted<T>(operation: &str) -> Result<T, ApiError> {
    Err(ApiError::Configuration {
        message: format!("no scripted response for {}", operation),
    })
}

impl MockGitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the recorded calls from others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_create_webhook(&self, result: Result<WebhookConfig, ApiError>) -> &Self {
        self.state().create_webhook.push_back(result);
        self
    }

    pub fn push_list_webhooks(&self, result: Result<Vec<WebhookConfig>, ApiError>) -> &Self {
        self.state().list_webhooks.push_back(result);
        self
    }

    pub fn push_get_webhook(&self, result: Result<WebhookConfig, ApiError>) -> &Self {
        self.state().get_webhook.push_back(result);
        self
    }

    pub fn push_edit_webhook(&self, result: Result<(), ApiError>) -> &Self {
        self.state().edit_webhook.push_back(result);
        self
    }

    pub fn push_delete_webhook(&self, result: Result<(), ApiError>) -> &Self {
        self.state().delete_webhook.push_back(result);
        self
    }

    pub fn push_create_pull_request_comment(&self, result: Result<(), ApiError>) -> &Self {
        self.state().create_pull_request_comment.push_back(result);
        self
    }

    pub fn push_list_pull_request_files(
        &self,
        result: Result<Vec<PullRequestFile>, ApiError>,
    ) -> &Self {
        self.state().list_pull_request_files.push_back(result);
        self
    }

    pub fn push_list_commits(&self, result: Result<Vec<Commit>, ApiError>) -> &Self {
        self.state().list_commits.push_back(result);
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// True if no call has been received.
    pub fn is_untouched(&self) -> bool {
        self.state().calls.is_empty()
    }
}

#[async_trait]
impl GitHubClient for MockGitHubClient {
    async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<WebhookConfig, ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::CreateWebhook {
            owner: owner.to_string(),
            repo: repo.to_string(),
            config,
        });
        state
            .create_webhook
            .pop_front()
            .unwrap_or_else(|| unscripted("create_webhook"))
    }

    async fn list_webhooks(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<WebhookConfig>, ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::ListWebhooks {
            owner: owner.to_string(),
            repo: repo.to_string(),
        });
        state
            .list_webhooks
            .pop_front()
            .unwrap_or_else(|| unscripted("list_webhooks"))
    }

    async fn get_webhook(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
    ) -> Result<WebhookConfig, ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::GetWebhook {
            owner: owner.to_string(),
            repo: repo.to_string(),
            id,
        });
        state
            .get_webhook
            .pop_front()
            .unwrap_or_else(|| unscripted("get_webhook"))
    }

    async fn edit_webhook(
        &self,
        owner: &str,
        repo: &str,
        config: WebhookConfig,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::EditWebhook {
            owner: owner.to_string(),
            repo: repo.to_string(),
            config,
        });
        state
            .edit_webhook
            .pop_front()
            .unwrap_or_else(|| unscripted("edit_webhook"))
    }

    async fn delete_webhook(&self, owner: &str, repo: &str, id: i64) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::DeleteWebhook {
            owner: owner.to_string(),
            repo: repo.to_string(),
            id,
        });
        state
            .delete_webhook
            .pop_front()
            .unwrap_or_else(|| unscripted("delete_webhook"))
    }

    async fn create_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::CreatePullRequestComment {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            body: body.to_string(),
        });
        state
            .create_pull_request_comment
            .pop_front()
            .unwrap_or_else(|| unscripted("create_pull_request_comment"))
    }

    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::ListPullRequestFiles {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        });
        state
            .list_pull_request_files
            .pop_front()
            .unwrap_or_else(|| unscripted("list_pull_request_files"))
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: Option<&str>,
    ) -> Result<Vec<Commit>, ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::ListCommits {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.map(str::to_string),
        });
        state
            .list_commits
            .pop_front()
            .unwrap_or_else(|| unscripted("list_commits"))
    }
}
