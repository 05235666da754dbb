//! Tests for event dispatch.

use super::*;
use crate::jobs::JobAction;

fn github(branch: &str) -> GitHubRepositoryConfig {
    GitHubRepositoryConfig {
        url: "https://github.com/grafana/git-ui-sync-demo".to_string(),
        branch: branch.to_string(),
        generate_dashboard_previews: true,
    }
}

fn context<'a>(
    github: Option<&'a GitHubRepositoryConfig>,
    sync_enabled: bool,
) -> DispatchContext<'a> {
    DispatchContext {
        repository: "unit-test-repo",
        full_name: "grafana/git-ui-sync-demo",
        github,
        sync_enabled,
    }
}

fn push_payload(git_ref: &str, full_name: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "ref": git_ref,
        "before": "0000000000000000000000000000000000000000",
        "after": "ab5446a53df9e5f8bdeed52250f51fad08e822bc",
        "repository": {
            "id": 900012,
            "full_name": full_name,
            "html_url": format!("https://github.com/{}", full_name)
        },
        "commits": []
    }))
    .unwrap()
}

fn pull_request_payload(action: &str, base: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "action": action,
        "number": 12,
        "pull_request": {
            "number": 12,
            "html_url": "https://github.com/grafana/git-ui-sync-demo/pull/12",
            "state": "open",
            "head": {
                "ref": "dashboard/1733653266690",
                "sha": "ab5446a53df9e5f8bdeed52250f51fad08e822bc"
            },
            "base": {
                "ref": base,
                "sha": "2d8e3b3a6d7c1f4a8e5b9c0d1e2f3a4b5c6d7e8f"
            }
        },
        "repository": {
            "full_name": "grafana/git-ui-sync-demo",
            "html_url": "https://github.com/grafana/git-ui-sync-demo"
        }
    }))
    .unwrap()
}

mod ping_and_unsupported {
    use super::*;

    #[test]
    fn test_ping_always_ok() {
        let config = github("main");

        for payload in [&b"{}"[..], &b"not even json"[..]] {
            let response = parse_webhook("ping", payload, &context(Some(&config), true)).unwrap();

            assert_eq!(response, WebhookResponse::ok("ping received"));
        }
    }

    #[test]
    fn test_issue_comment_not_implemented() {
        let config = github("main");

        let response =
            parse_webhook("issue_comment", b"{}", &context(Some(&config), true)).unwrap();

        assert_eq!(response.code, 501);
        assert!(response.job.is_none());
    }

    #[test]
    fn test_unknown_event_not_implemented() {
        let config = github("main");

        let response = parse_webhook("team", b"{}", &context(Some(&config), true)).unwrap();

        assert_eq!(response.code, 501);
        assert_eq!(response.message, "unsupported messageType: team");
        assert!(response.job.is_none());
    }

    #[test]
    fn test_empty_event_type_not_implemented() {
        let response = parse_webhook("", b"{}", &context(None, true)).unwrap();

        assert_eq!(response.code, 501);
        assert_eq!(response.message, "unsupported messageType: ");
    }
}

mod push {
    use super::*;

    #[test]
    fn test_tracked_branch_with_sync_enabled_schedules_pull() {
        let config = github("main");
        let payload = push_payload("refs/heads/main", "grafana/git-ui-sync-demo");

        let response = parse_webhook("push", &payload, &context(Some(&config), true)).unwrap();

        assert_eq!(response.code, 202);
        assert_eq!(response.job, Some(JobSpec::pull("unit-test-repo", true)));
    }

    #[test]
    fn test_tracked_branch_with_sync_disabled_is_ignored() {
        let config = github("main");
        let payload = push_payload("refs/heads/main", "grafana/git-ui-sync-demo");

        let response = parse_webhook("push", &payload, &context(Some(&config), false)).unwrap();

        assert_eq!(response.code, 200);
        assert!(response.job.is_none());
    }

    #[test]
    fn test_other_branch_is_ignored_regardless_of_sync() {
        let config = github("main");
        let payload = push_payload("refs/heads/feature", "grafana/git-ui-sync-demo");

        for sync_enabled in [true, false] {
            let response =
                parse_webhook("push", &payload, &context(Some(&config), sync_enabled)).unwrap();

            assert_eq!(response.code, 200);
            assert!(response.job.is_none());
        }
    }

    #[test]
    fn test_tag_push_is_ignored() {
        let config = github("main");
        let payload = push_payload("refs/tags/main", "grafana/git-ui-sync-demo");

        let response = parse_webhook("push", &payload, &context(Some(&config), true)).unwrap();

        assert_eq!(response.code, 200);
        assert!(response.job.is_none());
    }

    #[test]
    fn test_missing_repository() {
        let config = github("main");

        let error = parse_webhook(
            "push",
            br#"{"ref":"refs/heads/main"}"#,
            &context(Some(&config), true),
        )
        .unwrap_err();

        assert_eq!(error.to_string(), "missing repository in push event");
        assert_eq!(error.status_code(), 400);
    }

    #[test]
    fn test_repository_mismatch() {
        let config = github("main");
        let payload = push_payload("refs/heads/main", "different-owner/different-repo");

        let error = parse_webhook("push", &payload, &context(Some(&config), true)).unwrap_err();

        assert!(matches!(error, WebhookError::RepositoryMismatch));
        assert_eq!(error.to_string(), "repository mismatch");
    }

    #[test]
    fn test_repository_match_is_case_sensitive() {
        let config = github("main");
        let payload = push_payload("refs/heads/main", "Grafana/git-ui-sync-demo");

        let error = parse_webhook("push", &payload, &context(Some(&config), true)).unwrap_err();

        assert!(matches!(error, WebhookError::RepositoryMismatch));
    }

    #[test]
    fn test_missing_github_config() {
        let payload = push_payload("refs/heads/main", "grafana/git-ui-sync-demo");

        let error = parse_webhook("push", &payload, &context(None, true)).unwrap_err();

        assert_eq!(error.to_string(), "missing GitHub config");
    }

    #[test]
    fn test_invalid_json() {
        let config = github("main");

        let error =
            parse_webhook("push", b"{not json", &context(Some(&config), true)).unwrap_err();

        assert!(matches!(error, WebhookError::InvalidPayload(_)));
        assert_eq!(error.status_code(), 400);
    }
}

mod pull_request {
    use super::*;

    #[test]
    fn test_opened_against_tracked_branch_schedules_preview() {
        let config = github("main");
        let payload = pull_request_payload("opened", "main");

        let response =
            parse_webhook("pull_request", &payload, &context(Some(&config), true)).unwrap();

        assert_eq!(response.code, 202);
        assert_eq!(response.message, "pull request: opened");
        let job = response.job.unwrap();
        assert_eq!(job.repository, "unit-test-repo");
        assert_eq!(
            job.action,
            JobAction::PullRequest {
                pr: PullRequestJobOptions {
                    ref_name: "dashboard/1733653266690".to_string(),
                    hash: "ab5446a53df9e5f8bdeed52250f51fad08e822bc".to_string(),
                    pr: 12,
                    url: "https://github.com/grafana/git-ui-sync-demo/pull/12".to_string(),
                }
            }
        );
    }

    #[test]
    fn test_synchronize_schedules_preview() {
        let config = github("main");
        let payload = pull_request_payload("synchronize", "main");

        let response =
            parse_webhook("pull_request", &payload, &context(Some(&config), false)).unwrap();

        assert_eq!(response.code, 202);
        assert_eq!(response.message, "pull request: synchronize");
    }

    #[test]
    fn test_other_actions_are_ignored() {
        let config = github("main");

        for action in ["closed", "edited", "reopened", "labeled"] {
            let payload = pull_request_payload(action, "main");

            let response =
                parse_webhook("pull_request", &payload, &context(Some(&config), true)).unwrap();

            assert_eq!(response.code, 200);
            assert_eq!(
                response.message,
                format!("ignore pull request event: {}", action)
            );
            assert!(response.job.is_none());
        }
    }

    #[test]
    fn test_closed_against_other_branch_reports_action() {
        let config = github("main");
        let payload = pull_request_payload("closed", "develop");

        let response =
            parse_webhook("pull_request", &payload, &context(Some(&config), true)).unwrap();

        assert_eq!(response.message, "ignore pull request event: closed");
    }

    #[test]
    fn test_other_base_branch_is_ignored() {
        let config = github("main");
        let payload = pull_request_payload("opened", "develop");

        let response =
            parse_webhook("pull_request", &payload, &context(Some(&config), true)).unwrap();

        assert_eq!(response.code, 200);
        assert_eq!(
            response.message,
            "ignoring pull request event as develop is not the configured branch"
        );
        assert!(response.job.is_none());
    }

    #[test]
    fn test_missing_repository() {
        let config = github("main");

        let error = parse_webhook(
            "pull_request",
            br#"{"action":"opened"}"#,
            &context(Some(&config), true),
        )
        .unwrap_err();

        assert_eq!(error.to_string(), "missing repository in pull request event");
    }

    #[test]
    fn test_missing_github_config() {
        let payload = pull_request_payload("opened", "main");

        let error = parse_webhook("pull_request", &payload, &context(None, true)).unwrap_err();

        assert!(matches!(error, WebhookError::MissingGitHubConfig));
    }

    #[test]
    fn test_repository_mismatch() {
        let config = github("main");
        let payload = br#"{
            "action": "opened",
            "repository": { "full_name": "different-owner/different-repo" }
        }"#;

        let error =
            parse_webhook("pull_request", payload, &context(Some(&config), true)).unwrap_err();

        assert_eq!(error.to_string(), "repository mismatch");
    }

    #[test]
    fn test_missing_pull_request() {
        let config = github("main");
        let payload = br#"{
            "action": "opened",
            "repository": { "full_name": "grafana/git-ui-sync-demo" }
        }"#;

        let error =
            parse_webhook("pull_request", payload, &context(Some(&config), true)).unwrap_err();

        assert_eq!(error.to_string(), "expected PR in event");
    }
}
