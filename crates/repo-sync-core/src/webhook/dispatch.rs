//! Event dispatch: maps a delivery to a response and, possibly, a job.

use tracing::{debug, instrument};

use super::events::{PullRequestEvent, PushEvent};
use super::{WebhookError, WebhookResponse};
use crate::jobs::{JobSpec, PullRequestJobOptions};
use crate::model::GitHubRepositoryConfig;

/// Repository facts dispatch decides against.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    /// Repository resource name; becomes `JobSpec::repository`
    pub repository: &'a str,

    /// Expected `repository.full_name` of deliveries, i.e. `owner/repo`
    pub full_name: &'a str,

    pub github: Option<&'a GitHubRepositoryConfig>,

    pub sync_enabled: bool,
}

/// Map an event type and its raw payload to a response.
///
/// Business-rule non-matches (another branch, sync disabled, an ignored pull
/// request action) are successful responses without a job. Unknown event
/// types answer 501. Only malformed or misdirected deliveries are errors.
#[instrument(skip(payload, context), fields(repository = context.repository))]
pub fn parse_webhook(
    event_type: &str,
    payload: &[u8],
    context: &DispatchContext<'_>,
) -> Result<WebhookResponse, WebhookError> {
    match event_type {
        "ping" => Ok(WebhookResponse::ok("ping received")),
        "push" => parse_push(payload, context),
        "pull_request" => parse_pull_request(payload, context),
        "issue_comment" => Ok(WebhookResponse::not_implemented(
            "issue comment events are not supported",
        )),
        other => Ok(WebhookResponse::not_implemented(format!(
            "unsupported messageType: {}",
            other
        ))),
    }
}

fn parse_push(
    payload: &[u8],
    context: &DispatchContext<'_>,
) -> Result<WebhookResponse, WebhookError> {
    let event: PushEvent = serde_json::from_slice(payload)?;

    let repository = event
        .repository
        .ok_or(WebhookError::MissingRepository { event: "push" })?;
    if repository.full_name != context.full_name {
        return Err(WebhookError::RepositoryMismatch);
    }

    let github = context.github.ok_or(WebhookError::MissingGitHubConfig)?;

    let tracked_ref = format!("refs/heads/{}", github.branch);
    if event.ref_name != tracked_ref {
        debug!(pushed = %event.ref_name, tracked = %tracked_ref, "Ignoring push to untracked ref");
        return Ok(WebhookResponse::ok(""));
    }

    if !context.sync_enabled {
        debug!("Ignoring push while sync is disabled");
        return Ok(WebhookResponse::ok(""));
    }

    Ok(WebhookResponse::accepted(
        "",
        JobSpec::pull(context.repository, true),
    ))
}

fn parse_pull_request(
    payload: &[u8],
    context: &DispatchContext<'_>,
) -> Result<WebhookResponse, WebhookError> {
    let event: PullRequestEvent = serde_json::from_slice(payload)?;

    let repository = event.repository.ok_or(WebhookError::MissingRepository {
        event: "pull request",
    })?;
    let github = context.github.ok_or(WebhookError::MissingGitHubConfig)?;
    if repository.full_name != context.full_name {
        return Err(WebhookError::RepositoryMismatch);
    }

    let pull_request = event
        .pull_request
        .ok_or(WebhookError::MissingPullRequest)?;

    if event.action != "opened" && event.action != "synchronize" {
        return Ok(WebhookResponse::ok(format!(
            "ignore pull request event: {}",
            event.action
        )));
    }

    if pull_request.base.ref_name != github.branch {
        return Ok(WebhookResponse::ok(format!(
            "ignoring pull request event as {} is not the configured branch",
            pull_request.base.ref_name
        )));
    }

    let number = if pull_request.number != 0 {
        pull_request.number
    } else {
        event.number
    };

    Ok(WebhookResponse::accepted(
        format!("pull request: {}", event.action),
        JobSpec::pull_request(
            context.repository,
            PullRequestJobOptions {
                ref_name: pull_request.head.ref_name,
                hash: pull_request.head.sha,
                pr: number,
                url: pull_request.html_url,
            },
        ),
    ))
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
