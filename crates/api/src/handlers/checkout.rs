//! Checkout-session creation for membership renewals.
//!
//! Validates the form submission, derives the priced line items for the
//! selected billing-display mode, creates the hosted checkout session, and
//! records the session id on the organization's workspace page so the
//! webhook can correlate the payment later. The workspace write is
//! best-effort: the session already exists, so a recording failure must not
//! fail the request.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use renewal_core::{line_items, BillingDisplay, InvoiceData, OrganizationData};
use renewal_stripe::client::{metadata, CheckoutSessionParams};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub token: Option<String>,
    pub organization_data: Option<OrganizationData>,
    pub invoice_data: Option<InvoiceData>,
    #[serde(default)]
    pub billing_preferences: Option<BillingPreferences>,
    /// Accounting invoice created in parallel by the form, if any.
    pub qbo_invoice_id: Option<String>,
    /// Accounting invoice number for bookkeeper reference.
    pub qbo_invoice_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPreferences {
    pub billing_display: BillingDisplay,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    pub success: bool,
    pub message: &'static str,
    pub session_id: String,
    pub checkout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbo_invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbo_invoice_number: Option<String>,
}

/// POST /api/create-checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> AppResult<Json<CreateCheckoutResponse>> {
    let stripe = state.stripe()?.clone();

    let (Some(token), Some(organization), Some(invoice)) = (
        request.token.as_deref().filter(|t| !t.is_empty()),
        request.organization_data.as_ref(),
        request.invoice_data.as_ref(),
    ) else {
        return Err(AppError::BadRequest("Missing required data".into()));
    };

    let billing_display = request
        .billing_preferences
        .as_ref()
        .map(|p| p.billing_display)
        .unwrap_or(BillingDisplay::IndividualLineItems);

    tracing::info!(
        organization = %organization.name,
        ?billing_display,
        "Creating checkout session"
    );

    let treatment = state.config.checkout_tax;
    let items = line_items::build_line_items(
        invoice,
        billing_display,
        organization.province(),
        &stripe.config().catalog,
        treatment,
    );

    let session_metadata = build_session_metadata(token, organization, invoice, billing_display, &request);
    let intent_metadata = vec![
        (metadata::NOTION_TOKEN.into(), token.to_string()),
        (metadata::ORGANIZATION_NAME.into(), organization.name.clone()),
        (
            metadata::QBO_INVOICE_ID.into(),
            request.qbo_invoice_id.clone().unwrap_or_default(),
        ),
        (
            metadata::QBO_INVOICE_NUMBER.into(),
            request.qbo_invoice_number.clone().unwrap_or_default(),
        ),
    ];

    let params = CheckoutSessionParams {
        line_items: items,
        customer_email: organization
            .primary_contact
            .as_ref()
            .and_then(|c| c.work_email.clone()),
        metadata: session_metadata,
        payment_intent_metadata: intent_metadata,
        automatic_tax: treatment.automatic_tax(),
    };

    let session = stripe.create_checkout_session(&params).await?;

    // Record the session id on the organization page for webhook matching.
    // The checkout session already exists, so failures here are logged and
    // escalated but never fail the request.
    if let Some(notion) = &state.notion {
        let recorded = notion
            .record_checkout_session(
                token,
                &session.id,
                request.qbo_invoice_id.as_deref(),
                request.qbo_invoice_number.as_deref(),
            )
            .await;
        if let Err(err) = recorded {
            tracing::error!(error = %err, token, "Failed to record session on workspace page");
            escalate_recording_failure(&state, &organization.name, &session.id, &err).await;
        }
    } else {
        tracing::warn!("Workspace database not configured; session id not recorded");
    }

    Ok(Json(CreateCheckoutResponse {
        success: true,
        message: "Checkout session created",
        session_id: session.id,
        checkout_url: session.url,
        qbo_invoice_id: request.qbo_invoice_id,
        qbo_invoice_number: request.qbo_invoice_number,
    }))
}

/// Session metadata read back by the webhook handler.
fn build_session_metadata(
    token: &str,
    organization: &OrganizationData,
    invoice: &InvoiceData,
    billing_display: BillingDisplay,
    request: &CreateCheckoutRequest,
) -> Vec<(String, String)> {
    vec![
        (metadata::NOTION_TOKEN.into(), token.to_string()),
        (metadata::ORGANIZATION_NAME.into(), organization.name.clone()),
        (
            metadata::QBO_INVOICE_ID.into(),
            request.qbo_invoice_id.clone().unwrap_or_default(),
        ),
        (
            metadata::QBO_INVOICE_NUMBER.into(),
            request.qbo_invoice_number.clone().unwrap_or_default(),
        ),
        (metadata::INSTITUTION_SIZE.into(), invoice.institution_size.clone()),
        (metadata::BILLING_DISPLAY.into(), billing_display.name().into()),
        (metadata::MEMBERSHIP_FEE.into(), invoice.membership_fee.to_string()),
        (metadata::CONFERENCE_TOTAL.into(), invoice.conference_total.to_string()),
        (metadata::PAID_ATTENDEES.into(), invoice.paid_attendees.to_string()),
        (metadata::FREE_ATTENDEES.into(), invoice.free_attendees.to_string()),
    ]
}

/// Best-effort alert when the session id could not be recorded.
async fn escalate_recording_failure(
    state: &AppState,
    organization: &str,
    session_id: &str,
    err: &renewal_notion::NotionError,
) {
    let Some(mailer) = &state.mailer else {
        return;
    };
    let body = format!(
        "A checkout session was created but could not be recorded in the \
         workspace database.\n\nOrganization: {organization}\nSession: \
         {session_id}\nError: {err}\n\nThe customer can still pay; the \
         webhook will not be able to match this session to a page.\n"
    );
    if let Err(mail_err) = mailer
        .send_error_alert("Checkout session not recorded", &body)
        .await
    {
        tracing::error!(error = %mail_err, "Failed to send recording-failure alert");
    }
}
