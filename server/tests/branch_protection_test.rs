//! Branch Protection Flow Tests
//!
//! Sends `repository.created` deliveries through the router while GitHub's
//! repository API is mocked with wiremock.

mod helpers;

use axum::http::StatusCode;
use helpers::{body_to_json, TestApp, SECRET};
use serde_json::json;
use warden_common::InstallationId;
use warden_server::config::Config;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO_CREATED: &str = r#"{
    "action": "created",
    "installation": { "id": 42 },
    "repository": { "full_name": "octo-org/new-repo", "default_branch": "trunk" },
    "sender": { "login": "octocat" }
}"#;

fn config_for(mock_server: &MockServer, branch: Option<&str>) -> Config {
    let mut config = Config::default_for_test();
    config.api_url = mock_server.uri();
    config.protected_branch = branch.map(str::to_string);
    config
}

fn stored_protection() -> serde_json::Value {
    json!({
        "url": "https://api.github.com/repos/octo-org/new-repo/branches/main/protection",
        "required_pull_request_reviews": {
            "dismiss_stale_reviews": true,
            "require_code_owner_reviews": true,
            "required_approving_review_count": 2
        },
        "enforce_admins": { "enabled": true },
        "required_linear_history": { "enabled": false },
        "allow_force_pushes": { "enabled": false },
        "allow_deletions": { "enabled": false }
    })
}

#[tokio::test]
async fn new_repository_gets_protected_and_documented() {
    let mock_server = MockServer::start().await;
    let protection_path = "/repos/octo-org/new-repo/branches/main/protection";

    Mock::given(method("GET"))
        .and(path(protection_path))
        .and(header("authorization", "Bearer ghs_fake_42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not protected"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(protection_path))
        .and(body_json(json!({
            "required_status_checks": null,
            "enforce_admins": true,
            "required_pull_request_reviews": {
                "dismiss_stale_reviews": true,
                "require_code_owner_reviews": true,
                "required_approving_review_count": 2
            },
            "restrictions": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_protection()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo-org/new-repo/issues"))
        .and(body_partial_json(json!({
            "title": "Setup branch protection for main"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 1,
            "html_url": "https://github.com/octo-org/new-repo/issues/1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octo-org/new-repo/issues/1"))
        .and(body_json(json!({ "state": "closed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = TestApp::with_config(config_for(&mock_server, Some("main")));
    let response = app.deliver(Some("repository"), REPO_CREATED, SECRET).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await["status"], "handled");
    assert_eq!(app.broker.calls(), vec![InstallationId(42)]);

    // The issue body mentions the sender and the stored settings.
    let requests = mock_server.received_requests().await.unwrap();
    let issue = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("issue request");
    let issue: serde_json::Value = serde_json::from_slice(&issue.body).unwrap();
    let body = issue["body"].as_str().unwrap();
    assert!(body.starts_with("Hey @octocat,\n\nCongrats on starting the next big thing!"));
    assert!(body.contains("**main**"));
    assert!(body.contains("- **Required approving reviews**: 2"));
}

#[tokio::test]
async fn repository_default_branch_is_used_when_unconfigured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo-org/new-repo/branches/trunk/protection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_protection()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = TestApp::with_config(config_for(&mock_server, None));
    let response = app.deliver(Some("repository"), REPO_CREATED, SECRET).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn branch_with_reserved_characters_is_one_path_segment() {
    let mock_server = MockServer::start().await;
    let body = REPO_CREATED.replace("\"trunk\"", "\"release/fix#12\"");

    Mock::given(method("GET"))
        .and(path(
            "/repos/octo-org/new-repo/branches/release%2Ffix%2312/protection",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_protection()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // A truncated branch path must never be touched.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_protection()))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_protection()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = TestApp::with_config(config_for(&mock_server, None));
    let response = app.deliver(Some("repository"), &body, SECRET).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await["status"], "handled");
}

#[tokio::test]
async fn existing_protection_is_left_alone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo-org/new-repo/branches/main/protection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_protection()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = TestApp::with_config(config_for(&mock_server, Some("main")));
    let response = app.deliver(Some("repository"), REPO_CREATED, SECRET).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await["status"], "handled");
}

#[tokio::test]
async fn api_failure_is_handler_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Resource not accessible by integration"
        })))
        .mount(&mock_server)
        .await;

    let app = TestApp::with_config(config_for(&mock_server, Some("main")));
    let response = app.deliver(Some("repository"), REPO_CREATED, SECRET).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_to_json(response).await;
    assert_eq!(body["error"], "HANDLER_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("integration"));
}

#[tokio::test]
async fn created_event_without_repository_is_handler_error() {
    let mock_server = MockServer::start().await;

    let app = TestApp::with_config(config_for(&mock_server, Some("main")));
    let response = app
        .deliver(
            Some("repository"),
            r#"{"action":"created","installation":{"id":42}}"#,
            SECRET,
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn other_repository_actions_are_ignored() {
    let mock_server = MockServer::start().await;

    let app = TestApp::with_config(config_for(&mock_server, Some("main")));
    let body = REPO_CREATED.replace("\"created\"", "\"deleted\"");
    let response = app.deliver(Some("repository"), &body, SECRET).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await["status"], "ignored");
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
