use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use renewal_mailer::MailError;
use renewal_notion::NotionError;
use renewal_qbo::QboError;
use renewal_stripe::{SignatureError, StripeError};

/// Application-level error type for HTTP handlers.
///
/// Wraps the integration-client errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
/// Upstream failures map to 500 with the upstream status and body carried
/// in the message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required credentials or settings are missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The webhook signature did not verify.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The payment processor rejected or failed a request.
    #[error(transparent)]
    Stripe(#[from] StripeError),

    /// The accounting system rejected or failed a request.
    #[error(transparent)]
    Qbo(#[from] QboError),

    /// The workspace database rejected or failed a request.
    #[error(transparent)]
    Notion(#[from] NotionError),

    /// The email provider rejected or failed a request.
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg.clone())
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),

            AppError::Signature(err) => (
                StatusCode::BAD_REQUEST,
                "SIGNATURE_VERIFICATION_FAILED",
                format!("Webhook signature verification failed: {err}"),
            ),

            AppError::Stripe(err) => upstream("Payment processor", &err.to_string()),
            AppError::Qbo(err) => upstream("Accounting system", &err.to_string()),
            AppError::Notion(err) => upstream("Workspace database", &err.to_string()),
            AppError::Mail(err) => upstream("Email provider", &err.to_string()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an upstream API failure to a 500 with the upstream detail attached.
fn upstream(system: &str, detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(system, error = %detail, "Upstream API failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "UPSTREAM_ERROR",
        format!("{system} request failed: {detail}"),
    )
}
