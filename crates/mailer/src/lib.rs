//! Transactional and operational email via the provider's HTTP API.
//!
//! [`Mailer`] wraps the email provider's `/emails` endpoint to send
//! plain-text messages. Two specialized senders sit on top of the single
//! send primitive: an operational error alert to the admin recipient and the
//! bookkeeping coding breakdown to the bookkeeper recipient. Configuration
//! is loaded from environment variables; if `RESEND_API_KEY` is not set,
//! [`MailerConfig::from_env`] returns `None` and no mailer is constructed.

use serde::Deserialize;

use renewal_core::coding::InvoiceCoding;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Email provider error ({status}): {body}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// MailerConfig
// ---------------------------------------------------------------------------

/// Default sender address when `RESEND_SENDER_EMAIL` is not set.
const DEFAULT_SENDER: &str = "noreply@renewal.local";

/// Default provider API base; override with `RESEND_API_BASE`.
const DEFAULT_API_BASE: &str = "https://api.resend.com";

/// Configuration for the email provider.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Provider API key.
    pub api_key: String,
    /// RFC 5322 "From" address (must use a verified domain).
    pub sender: String,
    /// Recipient of operational error alerts.
    pub admin_email: String,
    /// Recipient of bookkeeping coding notifications.
    pub bookkeeper_email: String,
    /// Provider API base URL.
    pub api_base: String,
}

impl MailerConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `RESEND_API_KEY` is not set, signalling that email
    /// is not configured and sends should be skipped.
    ///
    /// | Variable                   | Required | Default                   |
    /// |----------------------------|----------|---------------------------|
    /// | `RESEND_API_KEY`           | yes      | —                         |
    /// | `RESEND_SENDER_EMAIL`      | no       | `noreply@renewal.local`   |
    /// | `ERROR_NOTIFICATION_EMAIL` | no       | sender address            |
    /// | `BOOKKEEPER_EMAIL`         | no       | sender address            |
    /// | `RESEND_API_BASE`          | no       | `https://api.resend.com`  |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let sender =
            std::env::var("RESEND_SENDER_EMAIL").unwrap_or_else(|_| DEFAULT_SENDER.into());
        Some(Self {
            api_key,
            admin_email: std::env::var("ERROR_NOTIFICATION_EMAIL")
                .unwrap_or_else(|_| sender.clone()),
            bookkeeper_email: std::env::var("BOOKKEEPER_EMAIL")
                .unwrap_or_else(|_| sender.clone()),
            api_base: std::env::var("RESEND_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            sender,
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

/// Sends plain-text emails through the provider's HTTP API.
pub struct Mailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl Mailer {
    /// Create a new mailer with the given configuration.
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Send a plain-text email. Returns the provider message id.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, MailError> {
        let payload = serde_json::json!({
            "from": self.config.sender,
            "to": [to],
            "subject": subject,
            "text": body,
        });

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let sent = response.json::<SendResponse>().await?;
        tracing::info!(to, subject, message_id = %sent.id, "Email sent");
        Ok(sent.id)
    }

    /// Send an operational error alert to the admin recipient.
    pub async fn send_error_alert(&self, subject: &str, body: &str) -> Result<String, MailError> {
        let to = self.config.admin_email.clone();
        tracing::warn!(to = %to, subject, "Sending error alert");
        self.send(&to, &format!("[Membership] {subject}"), body).await
    }

    /// Send the bookkeeping coding breakdown for a paid invoice.
    pub async fn send_bookkeeper_notification(
        &self,
        coding: &InvoiceCoding,
    ) -> Result<String, MailError> {
        let to = self.config.bookkeeper_email.clone();
        let subject = format!("[Bookkeeper] {}", coding.subject());
        let body = coding.compose_body();
        self.send(&to, &subject, &body).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mail_error_display_provider() {
        let err = MailError::Provider {
            status: 422,
            body: "invalid from address".into(),
        };
        assert_eq!(err.to_string(), "Email provider error (422): invalid from address");
    }

    #[test]
    fn send_response_tolerates_missing_id() {
        let parsed: SendResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.id.is_empty());
        let parsed: SendResponse =
            serde_json::from_value(serde_json::json!({ "id": "msg_1" })).unwrap();
        assert_eq!(parsed.id, "msg_1");
    }
}
