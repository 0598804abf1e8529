//! Operational email endpoints: the error-alert relay used by the renewal
//! form when a submission fails to sync, and a mail-delivery test page.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::html;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotificationRequest {
    pub error: Option<String>,
    pub details: Option<String>,
    pub organization_name: Option<String>,
    pub timestamp: Option<String>,
}

/// POST /api/send-error-notification
pub async fn send_error_notification(
    State(state): State<AppState>,
    Json(request): Json<ErrorNotificationRequest>,
) -> AppResult<Json<Value>> {
    let mailer = state.mailer()?.clone();

    tracing::warn!("Relaying sync-failure notification");

    let body = compose_sync_failure_body(&request);
    mailer
        .send_error_alert("Workspace Sync Failed - Action Required", &body)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Error notification sent",
    })))
}

/// Body of the sync-failure alert.
fn compose_sync_failure_body(request: &ErrorNotificationRequest) -> String {
    let mut body = String::new();
    body.push_str("WORKSPACE SYNC ERROR\n");
    body.push_str("====================\n\n");
    body.push_str("A membership renewal submission failed to sync to the workspace database.\n\n");

    if let Some(organization) = &request.organization_name {
        body.push_str(&format!("Organization: {organization}\n"));
    }

    let timestamp = request
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
    body.push_str(&format!("Timestamp: {timestamp}\n"));
    body.push_str(&format!(
        "Error: {}\n\n",
        request.error.as_deref().unwrap_or("Unknown error")
    ));

    if let Some(details) = &request.details {
        body.push_str("Error Details:\n");
        body.push_str(&format!("{details}\n\n"));
    }

    body.push_str("ACTION REQUIRED:\n");
    body.push_str("---------------\n");
    body.push_str("1. Check server logs for full error details\n");
    body.push_str("2. Verify the workspace API key is configured correctly\n");
    body.push_str("3. Check workspace database permissions\n\n");

    body.push_str("Note: the accounting and payment records were still created successfully.\n");
    body.push_str("The customer may have payment links but their data wasn't saved.\n");

    body
}

#[derive(Debug, Deserialize)]
pub struct MailTestQuery {
    /// Override recipient; defaults to the admin address.
    pub to: Option<String>,
}

/// GET /api/mail-test
///
/// Sends a test email and reports the outcome as an HTML page. Failures
/// return 500 so uptime checks can alert on them.
pub async fn mail_test(
    State(state): State<AppState>,
    Query(query): Query<MailTestQuery>,
) -> (StatusCode, Html<String>) {
    let Some(mailer) = &state.mailer else {
        let body = r#"<div class="error">
  <h1>Email Provider Not Configured</h1>
  <p>Set <code>RESEND_API_KEY</code> in the deployment environment.</p>
</div>"#;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(html::page("Mail Test - Missing Credentials", body)),
        );
    };

    let recipient = query
        .to
        .clone()
        .unwrap_or_else(|| mailer.config().admin_email.clone());
    let body = format!(
        "This is a test email from the membership renewal system.\n\n\
         If you received this, email delivery is configured correctly.\n\n\
         Configuration:\n- Sender: {}\n- Timestamp: {}\n\n\
         You can ignore this email.",
        mailer.config().sender,
        chrono::Utc::now().to_rfc3339(),
    );

    match mailer
        .send(&recipient, "[TEST] Membership System - Mail Test", &body)
        .await
    {
        Ok(message_id) => {
            let page_body = format!(
                r#"<div class="success">
  <h1>Email Sent Successfully</h1>
  <p><strong>Message ID:</strong> <code>{}</code></p>
  <p>Check <strong>{}</strong> for the test email.</p>
</div>"#,
                html::escape(&message_id),
                html::escape(&recipient),
            );
            (StatusCode::OK, Html(html::page("Mail Test - Success", &page_body)))
        }
        Err(err) => {
            tracing::error!(error = %err, "Mail test failed");
            let page_body = format!(
                r#"<div class="error">
  <h1>Email Send Failed</h1>
  <p><strong>Error:</strong> {}</p>
</div>
<div class="info">
  <h3>Current Configuration:</h3>
  <ul>
    <li><strong>Sender:</strong> {}</li>
    <li><strong>Recipient:</strong> {}</li>
  </ul>
</div>"#,
                html::escape(&err.to_string()),
                html::escape(&mailer.config().sender),
                html::escape(&recipient),
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(html::page("Mail Test - Failed", &page_body)),
            )
        }
    }
}
