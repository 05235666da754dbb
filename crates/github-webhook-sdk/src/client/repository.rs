//! Repository commit history operations for GitHub API.

use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::form_urlencoded;

use crate::client::RestGitHubClient;
use crate::error::ApiError;

/// Commit summary as returned by the commit listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub url: String,
    #[serde(default)]
    pub commit: CommitDetails,
}

/// Git-level details of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

/// Author signature of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: chrono::DateTime<chrono::Utc>,
}

impl RestGitHubClient {
    /// List commits on a branch, newest first, across all pages.
    ///
    /// When `path` is given only commits touching that path are returned.
    #[instrument(skip(self))]
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: Option<&str>,
    ) -> Result<Vec<Commit>, ApiError> {
        // The serializer is not Send and must be dropped before awaiting.
        let endpoint = {
            let mut query = form_urlencoded::Serializer::new(String::new());
            query.append_pair("sha", branch);
            if let Some(path) = path {
                query.append_pair("path", path);
            }
            query.append_pair("per_page", "100");
            format!("/repos/{}/{}/commits?{}", owner, repo, query.finish())
        };
        self.get_all_pages(&endpoint).await
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
