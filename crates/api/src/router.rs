//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests use the exact same middleware stack.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// Build the full application [`Router`] with all middleware layers.
///
/// The middleware stack is applied bottom-up:
///
/// 1. CORS
/// 2. Set request ID on incoming requests
/// 3. Structured request/response tracing
/// 4. Propagate request ID to response
/// 5. Request timeout
/// 6. Panic recovery (catch panics, return 500)
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        // Health check at root level (not under /api).
        .route("/health", get(handlers::health::health_check))
        // Integration routes.
        .nest("/api", api_routes())
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Build the `/api` route tree.
///
/// ```text
/// /create-checkout           POST  create a checkout session
/// /stripe-webhook            POST  payment webhook (raw-body signature check)
/// /qbo/oauth-callback        GET   accounting OAuth code exchange
/// /qbo/items                 GET   item listing (HTML)
/// /qbo/items/{id}            GET   item probe (JSON)
/// /qbo/tax-codes             GET   tax-code listing (HTML)
/// /qbo/token-status          GET   credential health report (JSON)
/// /qbo/diagnose              GET   credential diagnosis + refresh test (JSON)
/// /vendor-profile            POST  vendor-profile submission
/// /send-error-notification   POST  relay a sync-failure alert
/// /mail-test                 GET   email delivery test (HTML)
/// ```
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/create-checkout", post(handlers::checkout::create_checkout))
        .route("/stripe-webhook", post(handlers::stripe_webhook::stripe_webhook))
        .route("/qbo/oauth-callback", get(handlers::qbo_oauth::oauth_callback))
        .route("/qbo/items", get(handlers::qbo_admin::list_items))
        .route("/qbo/items/{id}", get(handlers::qbo_admin::probe_item))
        .route("/qbo/tax-codes", get(handlers::qbo_admin::list_tax_codes))
        .route("/qbo/token-status", get(handlers::qbo_status::token_status))
        .route("/qbo/diagnose", get(handlers::qbo_status::diagnose))
        .route(
            "/vendor-profile",
            post(handlers::vendor_profile::submit_vendor_profile),
        )
        .route(
            "/send-error-notification",
            post(handlers::notifications::send_error_notification),
        )
        .route("/mail-test", get(handlers::notifications::mail_test))
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid; misconfiguration
/// should fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
