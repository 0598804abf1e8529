//! Payment webhook processing.
//!
//! Verifies the processor's signature over the raw request body, then
//! handles `checkout.session.completed`: record the payment on the
//! organization's workspace page and notify the bookkeeper. Once the
//! signature verifies, the payment has already succeeded upstream, so every
//! downstream failure is logged and escalated by email instead of being
//! returned to the processor; a non-2xx here would only trigger webhook
//! retries for work we have already noted as failed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use renewal_core::coding::InvoiceCoding;
use renewal_core::{BillingDisplay, OrgAddress};
use renewal_stripe::client::{metadata, CheckoutSession};
use renewal_stripe::webhook::{self, WebhookEvent};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/stripe-webhook
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let stripe = state.stripe()?.clone();
    let secret = stripe
        .config()
        .webhook_secret
        .clone()
        .ok_or_else(|| AppError::Config("Webhook configuration missing".into()))?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature header".into()))?;

    webhook::verify_signature_now(&body, signature, &secret)?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook event received");

    let Some(session) = event.completed_checkout_session() else {
        // Other event types are acknowledged without processing.
        return Ok(Json(json!({ "received": true, "event_type": event.event_type })));
    };

    tracing::info!(
        session_id = %session.id,
        amount_total = session.amount_total,
        customer_email = session.customer_email.as_deref().unwrap_or(""),
        "Payment completed"
    );

    process_completed_session(&state, &session).await;

    Ok(Json(json!({ "received": true, "session_id": session.id })))
}

/// Run the post-payment side effects. Every step is best-effort; the
/// payment is already confirmed and the response must stay a success.
async fn process_completed_session(state: &AppState, session: &CheckoutSession) {
    let token = session.meta(metadata::NOTION_TOKEN);

    if token.is_empty() {
        tracing::warn!(session_id = %session.id, "No correlation token in session metadata");
    } else if let Some(notion) = &state.notion {
        let recorded = notion
            .record_payment(token, &session.id, session.payment_intent.as_deref())
            .await;
        if let Err(err) = recorded {
            tracing::error!(error = %err, token, "Failed to record payment in workspace database");
            escalate_update_failure(state, session, &err).await;
        }
    } else {
        tracing::warn!("Workspace database not configured; payment not recorded");
    }

    // Payment-method details are informational only.
    if let (Some(stripe), Some(intent_id)) = (&state.stripe, session.payment_intent.as_deref()) {
        match stripe.retrieve_payment_intent(intent_id).await {
            Ok(intent) => tracing::info!(
                payment_method = intent.payment_method_types.first().map(String::as_str).unwrap_or(""),
                "Payment intent retrieved"
            ),
            Err(err) => tracing::warn!(error = %err, "Failed to retrieve payment intent"),
        }
    }

    if let Some(mailer) = &state.mailer {
        let coding = invoice_coding_from_session(session);
        if let Err(err) = mailer.send_bookkeeper_notification(&coding).await {
            tracing::error!(error = %err, "Failed to send bookkeeper notification");
        }
    } else {
        tracing::warn!("Email provider not configured; bookkeeper notification skipped");
    }
}

/// Escalate a failed post-payment workspace update to the admin recipient.
async fn escalate_update_failure(
    state: &AppState,
    session: &CheckoutSession,
    err: &renewal_notion::NotionError,
) {
    let Some(mailer) = &state.mailer else {
        tracing::error!("Cannot escalate workspace-update failure: email not configured");
        return;
    };

    let organization = session.meta(metadata::ORGANIZATION_NAME);
    let body = format!(
        "A payment completed successfully but the workspace database could \
         not be updated.\n\nOrganization: {organization}\nSession: {}\n\
         Payment Intent: {}\nError: {err}\n\nACTION REQUIRED:\n\
         ---------------\n1. Mark the organization as paid manually\n\
         2. Verify the workspace API key and database permissions\n\n\
         The customer has been charged and saw a successful payment.\n",
        session.id,
        session.payment_intent.as_deref().unwrap_or("<none>"),
    );

    if let Err(mail_err) = mailer
        .send_error_alert("Payment recorded but workspace update failed", &body)
        .await
    {
        tracing::error!(error = %mail_err, "Failed to send escalation email");
    }
}

/// Rebuild the bookkeeping breakdown from the session metadata.
fn invoice_coding_from_session(session: &CheckoutSession) -> InvoiceCoding {
    let billing_display = BillingDisplay::from_name(session.meta(metadata::BILLING_DISPLAY));

    let qbo_invoice_id = session.meta(metadata::QBO_INVOICE_ID);
    let qbo_invoice_number = session.meta(metadata::QBO_INVOICE_NUMBER);
    let intent = session.payment_intent.as_deref().unwrap_or(&session.id);
    let tail = &session.id[session.id.len().saturating_sub(8)..];

    InvoiceCoding {
        organization_name: session.meta(metadata::ORGANIZATION_NAME).to_string(),
        invoice_id: if qbo_invoice_id.is_empty() {
            session.id.clone()
        } else {
            qbo_invoice_id.to_string()
        },
        invoice_number: if qbo_invoice_number.is_empty() {
            format!("STRIPE-{tail}")
        } else {
            qbo_invoice_number.to_string()
        },
        invoice_url: format!("https://dashboard.stripe.com/payments/{intent}"),
        billing_display,
        institution_size: session.meta(metadata::INSTITUTION_SIZE).to_string(),
        membership_fee: parse_amount(session.meta(metadata::MEMBERSHIP_FEE)),
        conference_total: parse_amount(session.meta(metadata::CONFERENCE_TOTAL)),
        // The processor computed tax on top of the line amounts.
        conference_hst: 0.0,
        paid_attendees: session.meta(metadata::PAID_ATTENDEES).parse().unwrap_or(0),
        free_attendees: session.meta(metadata::FREE_ATTENDEES).parse().unwrap_or(0),
        // The per-attendee breakdown does not fit in session metadata.
        attendee_breakdown: Vec::new(),
        total_amount: session.amount_total.unwrap_or(0) as f64 / 100.0,
        customer_address: Some(OrgAddress {
            province: session.customer_province().to_string(),
            ..OrgAddress::default()
        }),
    }
}

fn parse_amount(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(meta: Value) -> CheckoutSession {
        serde_json::from_value(json!({
            "id": "cs_test_abcdef12",
            "payment_intent": "pi_123",
            "amount_total": 169500,
            "currency": "cad",
            "customer_details": { "address": { "state": "ON" } },
            "metadata": meta
        }))
        .unwrap()
    }

    #[test]
    fn coding_prefers_accounting_invoice_references() {
        let coding = invoice_coding_from_session(&session(json!({
            "organization_name": "Example Store",
            "qbo_invoice_id": "1042",
            "qbo_invoice_number": "INV-1042",
            "billing_display": "single-item",
            "membership_fee": "1000",
            "conference_total": "500",
            "paid_attendees": "2",
            "free_attendees": "1"
        })));
        assert_eq!(coding.invoice_id, "1042");
        assert_eq!(coding.invoice_number, "INV-1042");
        assert_eq!(coding.billing_display, BillingDisplay::SingleItem);
        assert_eq!(coding.membership_fee, 1000.0);
        assert_eq!(coding.total_amount, 1695.0);
        assert_eq!(coding.invoice_url, "https://dashboard.stripe.com/payments/pi_123");
    }

    #[test]
    fn coding_falls_back_to_session_references() {
        let coding = invoice_coding_from_session(&session(json!({})));
        assert_eq!(coding.invoice_id, "cs_test_abcdef12");
        assert_eq!(coding.invoice_number, "STRIPE-abcdef12");
        assert_eq!(coding.billing_display, BillingDisplay::IndividualLineItems);
        assert_eq!(coding.membership_fee, 0.0);
        assert_eq!(
            coding.customer_address.as_ref().unwrap().province,
            "ON"
        );
    }
}
