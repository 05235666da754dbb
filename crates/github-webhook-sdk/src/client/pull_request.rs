//! Pull request operations for GitHub API.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::{check_status, RestGitHubClient};
use crate::error::ApiError;

/// A file changed by a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    /// Blob SHA of the file at the head of the pull request
    pub sha: String,

    /// Path of the file relative to the repository root
    pub filename: String,

    /// Change status ("added", "modified", "removed", "renamed", ...)
    pub status: String,

    #[serde(default)]
    pub additions: u64,

    #[serde(default)]
    pub deletions: u64,

    #[serde(default)]
    pub changes: u64,

    /// Original path for renamed files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

impl RestGitHubClient {
    // ========================================================================
    // Pull Request Operations
    // ========================================================================

    /// Post a comment on a pull request.
    ///
    /// Pull request conversation comments are issue comments in the REST API.
    #[instrument(skip(self, body))]
    pub async fn create_pull_request_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), ApiError> {
        let path = format!("/repos/{}/{}/issues/{}/comments", owner, repo, number);
        let response = self.post(&path, &CreateCommentRequest { body }).await?;
        check_status(response).await?;
        Ok(())
    }

    /// List every file changed by a pull request, across all pages.
    #[instrument(skip(self))]
    pub async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, ApiError> {
        let path = format!("/repos/{}/{}/pulls/{}/files?per_page=100", owner, repo, number);
        self.get_all_pages(&path).await
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
