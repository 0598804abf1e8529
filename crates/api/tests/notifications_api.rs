//! Integration tests for the operational email endpoints.

mod common;

use axum::http::StatusCode;
use httpmock::prelude::*;
use serde_json::json;

use common::{body_string, expect_json, get, post_json, unconfigured_state};

// ---------------------------------------------------------------------------
// Test: the error-notification relay composes and sends the alert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relays_sync_failure_alert() {
    let mail_server = MockServer::start_async().await;

    let mail_mock = mail_server
        .mock_async(|when, then| {
            when.method(POST).path("/emails").json_body_partial(
                r#"{
                    "to": ["admin@renewal.test"],
                    "subject": "[Membership] Workspace Sync Failed - Action Required"
                }"#,
            );
            then.status(200).json_body(json!({ "id": "msg_1" }));
        })
        .await;

    let mut state = unconfigured_state();
    state.mailer = Some(common::mailer(&mail_server.base_url()));

    let app = common::build_test_app(state);
    let response = post_json(
        app,
        "/api/send-error-notification",
        json!({
            "error": "timeout",
            "details": "connect timed out after 10s",
            "organizationName": "Example Campus Store"
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["success"], true);
    mail_mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: provider rejection surfaces as an upstream 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provider_rejection_surfaces_as_500() {
    let mail_server = MockServer::start_async().await;

    mail_server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(422).body("invalid from address");
        })
        .await;

    let mut state = unconfigured_state();
    state.mailer = Some(common::mailer(&mail_server.base_url()));

    let app = common::build_test_app(state);
    let response = post_json(
        app,
        "/api/send-error-notification",
        json!({ "error": "sync failed" }),
    )
    .await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;

    assert_eq!(json["code"], "UPSTREAM_ERROR");
}

// ---------------------------------------------------------------------------
// Test: mail test reports success and failure as HTML
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mail_test_reports_success() {
    let mail_server = MockServer::start_async().await;

    mail_server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(200).json_body(json!({ "id": "msg_test" }));
        })
        .await;

    let mut state = unconfigured_state();
    state.mailer = Some(common::mailer(&mail_server.base_url()));

    let app = common::build_test_app(state);
    let response = get(app, "/api/mail-test?to=ops@renewal.test").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Email Sent Successfully"));
    assert!(html.contains("msg_test"));
    assert!(html.contains("ops@renewal.test"));
}

#[tokio::test]
async fn mail_test_reports_failure_with_500() {
    let mail_server = MockServer::start_async().await;

    mail_server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(401).body("invalid api key");
        })
        .await;

    let mut state = unconfigured_state();
    state.mailer = Some(common::mailer(&mail_server.base_url()));

    let app = common::build_test_app(state);
    let response = get(app, "/api/mail-test").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_string(response).await;
    assert!(html.contains("Email Send Failed"));
}

#[tokio::test]
async fn mail_test_reports_missing_configuration() {
    let app = common::build_test_app(unconfigured_state());
    let response = get(app, "/api/mail-test").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_string(response).await;
    assert!(html.contains("Email Provider Not Configured"));
}
