//! Shared helpers for API integration tests.
//!
//! Builds the full application router with the same middleware stack as
//! production, with each integration client pointed at an `httpmock` server
//! standing in for the external SaaS API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use renewal_api::config::ServerConfig;
use renewal_api::router::build_app_router;
use renewal_api::state::AppState;
use renewal_core::{ProductCatalog, TaxTreatment};
use renewal_mailer::{Mailer, MailerConfig};
use renewal_notion::{NotionClient, NotionConfig};
use renewal_qbo::{OauthConfig, QboClient, QboConfig, QboOauthClient};
use renewal_stripe::{StripeClient, StripeConfig};

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:3000".to_string(),
        checkout_tax: TaxTreatment::Exclusive,
    }
}

/// App state with no integrations configured; handlers needing one must
/// answer with a configuration error.
pub fn unconfigured_state() -> AppState {
    AppState {
        config: Arc::new(test_config()),
        stripe: None,
        notion: None,
        qbo: None,
        qbo_oauth: None,
        mailer: None,
    }
}

/// Payment client pointed at a mock server.
pub fn stripe_client(base_url: &str) -> Arc<StripeClient> {
    Arc::new(StripeClient::new(StripeConfig {
        secret_key: "sk_test_xxx".into(),
        webhook_secret: Some(WEBHOOK_SECRET.into()),
        success_url: "https://renewal.test/success".into(),
        cancel_url: "https://renewal.test".into(),
        api_base: base_url.trim_end_matches('/').to_string(),
        catalog: ProductCatalog {
            membership_xsmall: "prod_mem_xs".into(),
            membership_small: "prod_mem_s".into(),
            membership_medium: "prod_mem_m".into(),
            membership_large: "prod_mem_l".into(),
            membership_xlarge: "prod_mem_xl".into(),
            conference: "prod_conf".into(),
            combined: "prod_combined".into(),
        },
    }))
}

/// Workspace client pointed at a mock server.
pub fn notion_client(base_url: &str) -> Arc<NotionClient> {
    Arc::new(NotionClient::new(NotionConfig {
        api_key: "secret_test".into(),
        submissions_db_id: Some("db_submissions".into()),
        organizations_db_id: Some("db_organizations".into()),
        member_tag: "25/26 Member".into(),
        api_base: base_url.trim_end_matches('/').to_string(),
    }))
}

/// Accounting client pointed at a mock server.
pub fn qbo_client(base_url: &str) -> Arc<QboClient> {
    Arc::new(QboClient::new(QboConfig {
        access_token: "qbo_access_token".into(),
        company_id: "9876543210".into(),
        base_url: base_url.trim_end_matches('/').to_string(),
    }))
}

/// Accounting OAuth client pointed at a mock token endpoint.
pub fn qbo_oauth_client(base_url: &str) -> Arc<QboOauthClient> {
    Arc::new(QboOauthClient::new(OauthConfig {
        client_id: "client_id_test".into(),
        client_secret: "client_secret_test".into(),
        token_url: format!("{}/oauth2/v1/tokens/bearer", base_url.trim_end_matches('/')),
    }))
}

/// Mailer pointed at a mock provider.
pub fn mailer(base_url: &str) -> Arc<Mailer> {
    Arc::new(Mailer::new(MailerConfig {
        api_key: "re_test".into(),
        sender: "noreply@renewal.test".into(),
        admin_email: "admin@renewal.test".into(),
        bookkeeper_email: "books@renewal.test".into(),
        api_base: base_url.trim_end_matches('/').to_string(),
    }))
}

/// Build the application router for a given state, mirroring `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a GET request with extra headers.
pub async fn get_with_headers(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a raw body and extra headers (webhook style).
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as a string (HTML pages).
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Expect a status code and return the JSON body.
pub async fn expect_json(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
