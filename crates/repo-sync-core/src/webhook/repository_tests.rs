//! Tests for the per-repository webhook façade.

use super::*;
use crate::jobs::{JobAction, JobSpec};
use crate::model::{GitHubRepositoryConfig, RepositorySpec, SyncOptions, WebhookStatus};
use crate::patch::PatchValue;
use bytes::Bytes;
use github_webhook_sdk::testing::{MockGitHubClient, RecordedCall};
use github_webhook_sdk::{SignatureError, WebhookConfig};

const SECRET: &str = "webhook-secret";
const WEBHOOK_URL: &str = "https://example.com/webhook";

fn repository(webhook: Option<WebhookStatus>) -> Repository {
    let mut repository = Repository::new(
        "test-repo",
        RepositorySpec {
            github: Some(GitHubRepositoryConfig {
                url: "https://github.com/grafana/grafana".to_string(),
                branch: "main".to_string(),
                generate_dashboard_previews: false,
            }),
            sync: SyncOptions { enabled: true },
        },
    );
    repository.status.webhook = webhook;
    repository
}

fn existing_status() -> WebhookStatus {
    WebhookStatus {
        id: 123,
        url: WEBHOOK_URL.to_string(),
        subscribed_events: vec!["push".to_string(), "pull_request".to_string()],
    }
}

fn facade(repository: Repository, client: Arc<MockGitHubClient>) -> WebhookRepository {
    WebhookRepository::new(
        repository,
        WEBHOOK_URL,
        client,
        Some(SecretValue::new(SECRET)),
    )
    .unwrap()
}

fn signed_request(event_type: &str, body: &'static [u8]) -> WebhookRequest {
    let signature = SignatureValidator::new(SECRET).sign(body).unwrap();
    WebhookRequest {
        event_type: event_type.to_string(),
        signature: Some(signature),
        body: Bytes::from_static(body),
    }
}

const PUSH_TO_MAIN: &[u8] =
    br#"{"ref":"refs/heads/main","repository":{"full_name":"grafana/grafana"}}"#;

mod owner_repo {
    use super::*;

    #[test]
    fn test_plain_url() {
        assert_eq!(
            parse_owner_repo("https://github.com/grafana/grafana").unwrap(),
            ("grafana".to_string(), "grafana".to_string())
        );
    }

    #[test]
    fn test_git_suffix_and_trailing_slash() {
        for url in [
            "https://github.com/grafana/git-ui-sync-demo.git",
            "https://github.com/grafana/git-ui-sync-demo/",
        ] {
            assert_eq!(
                parse_owner_repo(url).unwrap(),
                ("grafana".to_string(), "git-ui-sync-demo".to_string()),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_rejects_incomplete_urls() {
        for url in [
            "",
            "not a url",
            "https://github.com",
            "https://github.com/grafana",
            "https://github.com/grafana/.git",
        ] {
            assert_eq!(
                parse_owner_repo(url),
                Err(ConfigurationError::InvalidRepositoryUrl {
                    url: url.to_string()
                }),
                "{}",
                url
            );
        }
    }
}

mod construction {
    use super::*;

    #[test]
    fn test_derives_coordinates_from_github_url() {
        let repo = facade(repository(None), Arc::new(MockGitHubClient::new()));

        assert_eq!(repo.owner(), "grafana");
        assert_eq!(repo.repo(), "grafana");
        assert_eq!(repo.webhook_url(), WEBHOOK_URL);
        assert_eq!(repo.repository().name, "test-repo");
    }

    #[test]
    fn test_requires_github_config() {
        let mut repository = repository(None);
        repository.spec.github = None;

        let error = WebhookRepository::new(
            repository,
            WEBHOOK_URL,
            Arc::new(MockGitHubClient::new()),
            None,
        )
        .unwrap_err();

        assert_eq!(error, ConfigurationError::MissingGitHubConfig);
    }

    #[test]
    fn test_rejects_invalid_github_url() {
        let mut repository = repository(None);
        if let Some(github) = repository.spec.github.as_mut() {
            github.url = "https://github.com/grafana".to_string();
        }

        let error = WebhookRepository::new(
            repository,
            WEBHOOK_URL,
            Arc::new(MockGitHubClient::new()),
            None,
        )
        .unwrap_err();

        assert!(matches!(error, ConfigurationError::InvalidRepositoryUrl { .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let repo = facade(repository(None), Arc::new(MockGitHubClient::new()));

        let debug = format!("{:?}", repo);

        assert!(debug.contains("test-repo"));
        assert!(!debug.contains(SECRET));
    }
}

mod delivery {
    use super::*;

    #[tokio::test]
    async fn test_valid_push_schedules_pull() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );

        let response = repo
            .webhook(&signed_request("push", PUSH_TO_MAIN))
            .await
            .unwrap();

        assert_eq!(response.code, 202);
        assert_eq!(response.job, Some(JobSpec::pull("test-repo", true)));
    }

    #[tokio::test]
    async fn test_ping_with_valid_signature() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );

        let response = repo
            .webhook(&signed_request("ping", br#"{"zen":"Keep it logically awesome."}"#))
            .await
            .unwrap();

        assert_eq!(response.code, 200);
        assert_eq!(response.message, "ping received");
    }

    #[tokio::test]
    async fn test_pull_request_job_names_repository() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );
        let body: &'static [u8] = br#"{
            "action": "opened",
            "number": 7,
            "pull_request": {
                "number": 7,
                "html_url": "https://github.com/grafana/grafana/pull/7",
                "head": { "ref": "feature", "sha": "abc123" },
                "base": { "ref": "main", "sha": "def456" }
            },
            "repository": { "full_name": "grafana/grafana" }
        }"#;

        let response = repo
            .webhook(&signed_request("pull_request", body))
            .await
            .unwrap();

        let job = response.job.unwrap();
        assert_eq!(job.repository, "test-repo");
        assert!(matches!(job.action, JobAction::PullRequest { ref pr } if pr.pr == 7));
    }

    #[tokio::test]
    async fn test_rejects_delivery_without_webhook_status() {
        let repo = facade(repository(None), Arc::new(MockGitHubClient::new()));

        let error = repo
            .webhook(&signed_request("push", PUSH_TO_MAIN))
            .await
            .unwrap_err();

        assert!(matches!(error, WebhookError::UnexpectedRequest));
        assert_eq!(error.status_code(), 400);
    }

    #[tokio::test]
    async fn test_rejects_delivery_without_secret() {
        let repo = WebhookRepository::new(
            repository(Some(existing_status())),
            WEBHOOK_URL,
            Arc::new(MockGitHubClient::new()),
            None,
        )
        .unwrap();

        let error = repo
            .webhook(&signed_request("push", PUSH_TO_MAIN))
            .await
            .unwrap_err();

        assert!(matches!(error, WebhookError::UnexpectedRequest));
    }

    #[tokio::test]
    async fn test_zero_id_status_still_verifies() {
        let mut status = existing_status();
        status.id = 0;
        let repo = facade(repository(Some(status)), Arc::new(MockGitHubClient::new()));

        let response = repo
            .webhook(&signed_request("push", PUSH_TO_MAIN))
            .await
            .unwrap();

        assert_eq!(response.code, 202);
    }

    #[tokio::test]
    async fn test_invalid_signature_is_unauthorized_for_every_event() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );
        let forged = SignatureValidator::new("some-other-secret")
            .sign(PUSH_TO_MAIN)
            .unwrap();

        for event_type in ["push", "pull_request", "ping", "issue_comment", "team"] {
            let request = WebhookRequest {
                event_type: event_type.to_string(),
                signature: Some(forged.clone()),
                body: Bytes::from_static(PUSH_TO_MAIN),
            };

            let error = repo.webhook(&request).await.unwrap_err();

            assert!(
                matches!(error, WebhookError::InvalidSignature(SignatureError::Mismatch)),
                "{}",
                event_type
            );
            assert_eq!(error.status_code(), 401);
        }
    }

    #[tokio::test]
    async fn test_missing_signature_is_unauthorized() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );
        let request = WebhookRequest {
            event_type: "ping".to_string(),
            signature: None,
            body: Bytes::from_static(b"{}"),
        };

        let error = repo.webhook(&request).await.unwrap_err();

        assert_eq!(error.status_code(), 401);
    }

    #[tokio::test]
    async fn test_signature_covers_exact_body() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );
        let mut request = signed_request("push", PUSH_TO_MAIN);
        request.body = Bytes::from_static(
            br#"{"ref":"refs/heads/main", "repository":{"full_name":"grafana/grafana"}}"#,
        );

        let error = repo.webhook(&request).await.unwrap_err();

        assert!(matches!(error, WebhookError::InvalidSignature(_)));
    }

    #[tokio::test]
    async fn test_delivery_for_other_repository_is_rejected() {
        let repo = facade(
            repository(Some(existing_status())),
            Arc::new(MockGitHubClient::new()),
        );

        let error = repo
            .webhook(&signed_request(
                "push",
                br#"{"ref":"refs/heads/main","repository":{"full_name":"grafana/loki"}}"#,
            ))
            .await
            .unwrap_err();

        assert!(matches!(error, WebhookError::RepositoryMismatch));
    }
}

mod comments {
    use super::*;

    #[tokio::test]
    async fn test_comment_pull_request() {
        let client = Arc::new(MockGitHubClient::new());
        client.push_create_pull_request_comment(Ok(()));
        let repo = facade(repository(None), client.clone());

        repo.comment_pull_request(12, "Preview ready").await.unwrap();

        assert_eq!(
            client.calls(),
            vec![RecordedCall::CreatePullRequestComment {
                owner: "grafana".to_string(),
                repo: "grafana".to_string(),
                number: 12,
                body: "Preview ready".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_comment_failure_propagates() {
        let client = Arc::new(MockGitHubClient::new());
        client.push_create_pull_request_comment(Err(ApiError::NotFound));
        let repo = facade(repository(None), client);

        let error = repo.comment_pull_request(12, "Preview ready").await.unwrap_err();

        assert!(error.is_not_found());
    }
}

mod lifecycle {
    use super::*;

    fn remote(id: i64) -> WebhookConfig {
        WebhookConfig {
            id,
            events: vec!["push".to_string(), "pull_request".to_string()],
            active: true,
            url: WEBHOOK_URL.to_string(),
            content_type: "json".to_string(),
            secret: String::new(),
        }
    }

    #[tokio::test]
    async fn test_on_create() {
        let client = Arc::new(MockGitHubClient::new());
        client.push_create_webhook(Ok(remote(123)));
        let repo = facade(repository(None), client.clone());

        let ops = repo.on_create().await.unwrap();

        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0].value, PatchValue::WebhookStatus(s) if s.id == 123));
    }

    #[tokio::test]
    async fn test_adopt_existing_scopes_lookup_to_repository() {
        let client = Arc::new(MockGitHubClient::new());
        client
            .push_list_webhooks(Ok(vec![remote(123)]))
            .push_edit_webhook(Ok(()));
        let repo = facade(repository(None), client.clone());

        let ops = repo.adopt_existing().await.unwrap().unwrap();

        assert!(matches!(&ops[0].value, PatchValue::WebhookStatus(s) if s.id == 123));
        assert!(matches!(
            &client.calls()[0],
            RecordedCall::ListWebhooks { owner, repo } if owner == "grafana" && repo == "grafana"
        ));
    }

    #[tokio::test]
    async fn test_on_update_uses_persisted_status() {
        let client = Arc::new(MockGitHubClient::new());
        client.push_get_webhook(Ok(remote(123)));
        let repo = facade(repository(Some(existing_status())), client.clone());

        let ops = repo.on_update().await.unwrap();

        assert!(ops.is_empty());
        assert!(matches!(
            client.calls()[..],
            [RecordedCall::GetWebhook { id: 123, .. }]
        ));
    }

    #[tokio::test]
    async fn test_on_delete() {
        let client = Arc::new(MockGitHubClient::new());
        client.push_delete_webhook(Ok(()));
        let repo = facade(repository(Some(existing_status())), client.clone());

        repo.on_delete().await.unwrap();

        assert!(matches!(
            client.calls()[..],
            [RecordedCall::DeleteWebhook { id: 123, .. }]
        ));
    }

    #[tokio::test]
    async fn test_disabled_webhooks_never_call_github() {
        let client = Arc::new(MockGitHubClient::new());
        let repo = WebhookRepository::new(
            repository(Some(existing_status())),
            "",
            client.clone(),
            Some(SecretValue::new(SECRET)),
        )
        .unwrap();

        assert!(repo.on_create().await.unwrap().is_empty());
        assert!(repo.adopt_existing().await.unwrap().is_none());
        assert!(repo.on_update().await.unwrap().is_empty());
        repo.on_delete().await.unwrap();

        assert!(client.is_untouched());
    }
}
