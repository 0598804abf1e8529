//! REST client for the payment processor's checkout endpoints.
//!
//! The processor's API takes `application/x-www-form-urlencoded` bodies with
//! bracketed nesting (`line_items[0][price_data][currency]`), so the request
//! is assembled as flat key/value pairs rather than JSON.

use std::collections::HashMap;

use serde::Deserialize;

use renewal_core::LineItem;

use crate::config::StripeConfig;

/// Session and payment-intent metadata keys shared between the checkout
/// creation handler and the webhook handler.
pub mod metadata {
    pub const NOTION_TOKEN: &str = "notion_token";
    pub const ORGANIZATION_NAME: &str = "organization_name";
    pub const QBO_INVOICE_ID: &str = "qbo_invoice_id";
    pub const QBO_INVOICE_NUMBER: &str = "qbo_invoice_number";
    pub const INSTITUTION_SIZE: &str = "institution_size";
    pub const BILLING_DISPLAY: &str = "billing_display";
    pub const MEMBERSHIP_FEE: &str = "membership_fee";
    pub const CONFERENCE_TOTAL: &str = "conference_total";
    pub const PAID_ATTENDEES: &str = "paid_attendees";
    pub const FREE_ATTENDEES: &str = "free_attendees";
}

/// Errors from the payment-processor REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The processor returned a non-2xx status code.
    #[error("Payment API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },
}

/// A checkout session as created or delivered in a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted checkout URL (present on creation).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    /// Total charged, in cents (webhook events).
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Metadata value by key, empty string when absent.
    pub fn meta(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or("")
    }

    /// Billing-address state/province collected at checkout, if any.
    pub fn customer_province(&self) -> &str {
        self.customer_details
            .as_ref()
            .and_then(|d| d.address.as_ref())
            .and_then(|a| a.state.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub address: Option<CustomerAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerAddress {
    #[serde(default)]
    pub state: Option<String>,
}

/// A payment intent, retrieved for payment-method details.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub payment_method_types: Vec<String>,
}

/// Inputs for creating a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub line_items: Vec<LineItem>,
    pub customer_email: Option<String>,
    /// Attached to the session object; read back by the webhook handler.
    pub metadata: Vec<(String, String)>,
    /// Attached to the resulting payment intent for dashboard correlation.
    pub payment_intent_metadata: Vec<(String, String)>,
    /// Whether the processor should compute tax on top of the line amounts.
    pub automatic_tax: bool,
}

/// HTTP client for the payment processor.
pub struct StripeClient {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Create a hosted checkout session.
    ///
    /// Sends `POST /v1/checkout/sessions` with the line items, redirect URLs
    /// and metadata encoded as bracketed form fields.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let form = session_form(&self.config, params);

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        let session: CheckoutSession = Self::parse_response(response).await?;
        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    /// Retrieve a payment intent by id.
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{id}", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, then parse JSON.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StripeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// Flatten session parameters into the processor's bracketed form encoding.
fn session_form(config: &StripeConfig, params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        (
            "success_url".into(),
            format!("{}?session_id={{CHECKOUT_SESSION_ID}}", config.success_url),
        ),
        ("cancel_url".into(), config.cancel_url.clone()),
        ("customer_creation".into(), "always".into()),
        ("billing_address_collection".into(), "required".into()),
        ("phone_number_collection[enabled]".into(), "false".into()),
        (
            "automatic_tax[enabled]".into(),
            params.automatic_tax.to_string(),
        ),
    ];

    if let Some(email) = &params.customer_email {
        form.push(("customer_email".into(), email.clone()));
    }

    for (i, item) in params.line_items.iter().enumerate() {
        form.push((format!("line_items[{i}][price_data][currency]"), "cad".into()));
        form.push((
            format!("line_items[{i}][price_data][product]"),
            item.product.clone(),
        ));
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount_cents.to_string(),
        ));
        form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        if let Some(description) = &item.description {
            form.push((format!("line_items[{i}][description]"), description.clone()));
        }
    }

    for (key, value) in &params.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    for (key, value) in &params.payment_intent_metadata {
        form.push((format!("payment_intent_data[metadata][{key}]"), value.clone()));
    }

    form
}
