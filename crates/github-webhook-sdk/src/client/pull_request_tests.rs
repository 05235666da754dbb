//! Tests for pull request operations.

use super::*;
use crate::client::ClientConfig;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RestGitHubClient {
    RestGitHubClient::builder()
        .config(ClientConfig::default().with_github_api_url(server.uri()))
        .token("ghp_test_token")
        .build()
        .unwrap()
}

fn file_json(filename: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "sha": "bbcd538c8e72b8c175046e27cc8f907076331401",
        "filename": filename,
        "status": status,
        "additions": 103,
        "deletions": 21,
        "changes": 124,
        "blob_url": "https://github.com/octocat/Hello-World/blob/6dcb09b/file1.txt",
        "patch": "@@ -132,7 +132,7 @@"
    })
}

#[tokio::test]
async fn test_create_pull_request_comment_posts_issue_comment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/grafana/grafana/issues/42/comments"))
        .and(body_json(serde_json::json!({ "body": "Preview ready" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 1,
            "body": "Preview ready"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let result = client
        .create_pull_request_comment("grafana", "grafana", 42, "Preview ready")
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_pull_request_comment_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/grafana/grafana/issues/42/comments"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let result = client
        .create_pull_request_comment("grafana", "grafana", 42, "Preview ready")
        .await;

    assert!(matches!(result, Err(ApiError::AuthorizationFailed)));
}

#[tokio::test]
async fn test_list_pull_request_files_single_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/grafana/grafana/pulls/42/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            file_json("dashboards/a.json", "added"),
            file_json("dashboards/b.json", "modified")
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let files = client
        .list_pull_request_files("grafana", "grafana", 42)
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].filename, "dashboards/a.json");
    assert_eq!(files[0].status, "added");
    assert_eq!(files[1].changes, 124);
    assert!(files[1].previous_filename.is_none());
}

#[tokio::test]
async fn test_list_pull_request_files_follows_next_link() {
    let mock_server = MockServer::start().await;
    let next = format!(
        "<{}/repos/grafana/grafana/pulls/42/files?per_page=100&page=2>; rel=\"next\", <{}/repos/grafana/grafana/pulls/42/files?per_page=100&page=2>; rel=\"last\"",
        mock_server.uri(),
        mock_server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/repos/grafana/grafana/pulls/42/files"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([file_json("dashboards/c.json", "removed")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/grafana/grafana/pulls/42/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(serde_json::json!([file_json("dashboards/a.json", "added")])),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let files = client
        .list_pull_request_files("grafana", "grafana", 42)
        .await
        .unwrap();

    let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["dashboards/a.json", "dashboards/c.json"]);
}

#[tokio::test]
async fn test_list_pull_request_files_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/grafana/grafana/pulls/999/files"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let result = client.list_pull_request_files("grafana", "grafana", 999).await;

    assert!(matches!(result, Err(ApiError::NotFound)));
}
