//! GitHub event payloads, reduced to the fields dispatch reads.
//!
//! Every field is optional or defaulted so that a structurally incomplete
//! payload reaches the dispatch rules instead of failing to decode.

use serde::Deserialize;

/// Repository block shared by event payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRepository {
    #[serde(default)]
    pub full_name: String,
}

/// `push` event payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    /// Full ref that was pushed, e.g. `refs/heads/main`
    #[serde(rename = "ref", default)]
    pub ref_name: String,

    #[serde(default)]
    pub repository: Option<EventRepository>,
}

/// `pull_request` event payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub number: u64,

    #[serde(default)]
    pub repository: Option<EventRepository>,

    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub number: u64,

    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub head: BranchRef,

    #[serde(default)]
    pub base: BranchRef,
}

/// Head or base of a pull request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchRef {
    /// Branch name, without `refs/heads/`
    #[serde(rename = "ref", default)]
    pub ref_name: String,

    #[serde(default)]
    pub sha: String,
}
