//! Sync jobs produced by webhook dispatch and the queue they are handed to.
//!
//! The core never runs jobs. It only decides which job a delivery calls for;
//! the HTTP layer enqueues it on a [`JobQueue`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A unit of work for one repository.
///
/// Serialises flat, with the action as a discriminator next to its options:
/// `{"repository":"r","action":"pull","pull":{"incremental":true}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Name of the repository resource the job belongs to
    pub repository: String,

    #[serde(flatten)]
    pub action: JobAction,
}

impl JobSpec {
    /// Incremental pull of the tracked branch.
    pub fn pull(repository: impl Into<String>, incremental: bool) -> Self {
        Self {
            repository: repository.into(),
            action: JobAction::Pull {
                pull: SyncJobOptions { incremental },
            },
        }
    }

    /// Preview of a pull request.
    pub fn pull_request(repository: impl Into<String>, options: PullRequestJobOptions) -> Self {
        Self {
            repository: repository.into(),
            action: JobAction::PullRequest { pr: options },
        }
    }
}

/// What a job does. Exactly one options payload exists per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum JobAction {
    Pull { pull: SyncJobOptions },
    PullRequest { pr: PullRequestJobOptions },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJobOptions {
    /// Only apply changes since the last sync
    #[serde(default)]
    pub incremental: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestJobOptions {
    /// Head branch of the pull request
    #[serde(rename = "ref")]
    pub ref_name: String,

    /// Head commit SHA
    pub hash: String,

    /// Pull request number
    pub pr: u64,

    /// Pull request web URL
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    #[error("job queue is full")]
    Full,

    #[error("job queue unavailable: {message}")]
    Unavailable { message: String },
}

/// Destination for jobs produced by webhook deliveries.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: JobSpec) -> Result<(), JobQueueError>;
}

/// FIFO in-memory job queue.
#[derive(Clone, Default)]
pub struct InMemoryJobQueue {
    jobs: Arc<Mutex<VecDeque<JobSpec>>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    /// Remove and return every queued job, oldest first.
    pub async fn drain(&self) -> Vec<JobSpec> {
        self.jobs.lock().await.drain(..).collect()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: JobSpec) -> Result<(), JobQueueError> {
        tracing::debug!(repository = %job.repository, "Job enqueued");
        self.jobs.lock().await.push_back(job);
        Ok(())
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
