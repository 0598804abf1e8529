//! Integration tests for checkout-session creation.

mod common;

use axum::http::StatusCode;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;

use common::{expect_json, post_json, unconfigured_state};

fn checkout_request() -> serde_json::Value {
    json!({
        "token": "tok_1",
        "organizationData": {
            "name": "Example Campus Store",
            "address": { "province": "Ontario" },
            "primaryContact": { "workEmail": "buyer@example.test" }
        },
        "invoiceData": {
            "membershipFee": 1000.0,
            "conferenceTotal": 500.0,
            "institutionSize": "Medium",
            "paidAttendees": 2,
            "freeAttendees": 1,
            "attendeeBreakdown": [
                { "name": "Ada", "category": "paid", "reason": "Delegate" },
                { "name": "Grace", "category": "paid", "reason": "Delegate" },
                { "name": "Linus", "category": "comp", "reason": "Speaker" }
            ]
        },
        "billingPreferences": { "billingDisplay": "membership-conference" },
        "qboInvoiceId": "1042",
        "qboInvoiceNumber": "INV-1042"
    })
}

// ---------------------------------------------------------------------------
// Test: session created, id recorded on the organization page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creates_session_and_records_it() {
    let stripe_server = MockServer::start_async().await;
    let notion_server = MockServer::start_async().await;

    let stripe_mock = stripe_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkout/sessions")
                .body_contains("line_items%5B0%5D%5Bprice_data%5D%5Bproduct%5D=prod_mem_m");
            then.status(200).json_body(json!({
                "id": "cs_test_123",
                "url": "https://checkout.test/pay/cs_test_123"
            }));
        })
        .await;

    let notion_mock = notion_server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/v1/pages/tok_1")
                .json_body_partial(
                    r#"{"properties": {"Stripe Session ID": {"rich_text": [{"text": {"content": "cs_test_123"}}]}}}"#,
                );
            then.status(200).json_body(json!({ "id": "tok_1" }));
        })
        .await;

    let mut state = unconfigured_state();
    state.stripe = Some(common::stripe_client(&stripe_server.base_url()));
    state.notion = Some(common::notion_client(&notion_server.base_url()));

    let app = common::build_test_app(state);
    let response = post_json(app, "/api/create-checkout", checkout_request()).await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["sessionId"], "cs_test_123");
    assert_eq!(json["checkoutUrl"], "https://checkout.test/pay/cs_test_123");
    assert_eq!(json["qboInvoiceId"], "1042");

    stripe_mock.assert_async().await;
    notion_mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: workspace recording failure does not fail the request
// ---------------------------------------------------------------------------

#[tokio::test]
async fn succeeds_even_when_recording_fails() {
    let stripe_server = MockServer::start_async().await;
    let notion_server = MockServer::start_async().await;

    stripe_server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkout/sessions");
            then.status(200).json_body(json!({
                "id": "cs_test_456",
                "url": "https://checkout.test/pay/cs_test_456"
            }));
        })
        .await;

    let notion_mock = notion_server
        .mock_async(|when, then| {
            when.method(PATCH).path("/v1/pages/tok_1");
            then.status(500).body("internal error");
        })
        .await;

    let mut state = unconfigured_state();
    state.stripe = Some(common::stripe_client(&stripe_server.base_url()));
    state.notion = Some(common::notion_client(&notion_server.base_url()));

    let app = common::build_test_app(state);
    let response = post_json(app, "/api/create-checkout", checkout_request()).await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["sessionId"], "cs_test_456");
    notion_mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: missing required fields are a 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_fields_return_400() {
    let stripe_server = MockServer::start_async().await;

    let mut state = unconfigured_state();
    state.stripe = Some(common::stripe_client(&stripe_server.base_url()));

    let app = common::build_test_app(state);
    let response = post_json(
        app,
        "/api/create-checkout",
        json!({ "organizationData": { "name": "No Token" } }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;

    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("Missing required data"));
}

// ---------------------------------------------------------------------------
// Test: payment processor not configured is a 500 diagnostic
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unconfigured_processor_returns_500() {
    let app = common::build_test_app(unconfigured_state());
    let response = post_json(app, "/api/create-checkout", checkout_request()).await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;

    assert_eq!(json["code"], "CONFIG_ERROR");
}

// ---------------------------------------------------------------------------
// Test: upstream rejection surfaces as 500 with the upstream body attached
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_rejection_surfaces_as_500() {
    let stripe_server = MockServer::start_async().await;
    stripe_server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkout/sessions");
            then.status(402).body("card processing unavailable");
        })
        .await;

    let mut state = unconfigured_state();
    state.stripe = Some(common::stripe_client(&stripe_server.base_url()));

    let app = common::build_test_app(state);
    let response = post_json(app, "/api/create-checkout", checkout_request()).await;
    let json = expect_json(response, StatusCode::INTERNAL_SERVER_ERROR).await;

    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("card processing unavailable"));
}
