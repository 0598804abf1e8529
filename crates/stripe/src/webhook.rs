//! Webhook signature verification and event parsing.
//!
//! The processor signs each webhook delivery with an HMAC-SHA256 over
//! `"{timestamp}.{raw_body}"` and sends it in a header shaped like
//! `t=1700000000,v1=<hex digest>[,v1=...]`. Verification must run over the
//! raw request body before any JSON parsing.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed payload, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Event type emitted when a checkout completes successfully.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Signature verification failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The signature header is missing parts or not in `t=,v1=` form.
    #[error("Malformed signature header")]
    Malformed,

    /// The timestamp is outside the replay-protection window.
    #[error("Signature timestamp outside tolerance")]
    Expired,

    /// No candidate digest matched the computed HMAC.
    #[error("Signature mismatch")]
    Mismatch,
}

/// Verify a webhook signature against the raw request body.
///
/// `now_unix` is injected so tests can pin the clock; production callers use
/// [`verify_signature_now`].
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now_unix: i64,
) -> Result<(), SignatureError> {
    let (timestamp, candidates) = parse_signature_header(header)?;

    if (now_unix - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    for candidate in candidates {
        let Ok(digest) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        // verify_slice is a constant-time comparison.
        if mac.verify_slice(&digest).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

/// [`verify_signature`] with the current wall clock and default tolerance.
pub fn verify_signature_now(
    payload: &[u8],
    header: &str,
    secret: &str,
) -> Result<(), SignatureError> {
    verify_signature(
        payload,
        header,
        secret,
        DEFAULT_TOLERANCE_SECS,
        chrono::Utc::now().timestamp(),
    )
}

/// Split the signature header into its timestamp and `v1` digest candidates.
fn parse_signature_header(header: &str) -> Result<(i64, Vec<&str>), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => {
                timestamp = value.parse::<i64>().ok();
            }
            (Some("v1"), Some(value)) => candidates.push(value),
            _ => {}
        }
    }

    match (timestamp, candidates.is_empty()) {
        (Some(t), false) => Ok((t, candidates)),
        _ => Err(SignatureError::Malformed),
    }
}

/// A parsed webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// The completed checkout session, when this event is a
    /// `checkout.session.completed`. Other event types return `None`.
    pub fn completed_checkout_session(&self) -> Option<crate::client::CheckoutSession> {
        if self.event_type != CHECKOUT_SESSION_COMPLETED {
            return None;
        }
        serde_json::from_value(self.data.object.clone()).ok()
    }
}
