//! Payment-processor configuration loaded from environment variables.

use renewal_core::ProductCatalog;

/// Default API base; override with `STRIPE_API_BASE` (tests point this at a
/// mock server).
const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Configuration for the payment-processor integration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key.
    pub secret_key: String,
    /// Webhook signing secret; absent when webhooks are not configured.
    pub webhook_secret: Option<String>,
    /// Where the processor redirects after a successful payment. The
    /// `{CHECKOUT_SESSION_ID}` placeholder is appended at session creation.
    pub success_url: String,
    /// Where the processor redirects on cancel.
    pub cancel_url: String,
    /// REST API base URL.
    pub api_base: String,
    /// Product identifiers per membership size band plus conference/combined.
    pub catalog: ProductCatalog,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `STRIPE_SECRET_KEY` is not set, signalling that the
    /// payment integration is not configured.
    ///
    /// | Variable                             | Required | Default                       |
    /// |--------------------------------------|----------|-------------------------------|
    /// | `STRIPE_SECRET_KEY`                  | yes      | —                             |
    /// | `STRIPE_WEBHOOK_SECRET`              | no       | —                             |
    /// | `STRIPE_SUCCESS_URL`                 | no       | `http://localhost:5173/success` |
    /// | `STRIPE_CANCEL_URL`                  | no       | `http://localhost:5173`       |
    /// | `STRIPE_API_BASE`                    | no       | `https://api.stripe.com`      |
    /// | `STRIPE_PRODUCT_MEMBERSHIP_XSMALL`.. | no       | empty                         |
    /// | `STRIPE_PRODUCT_CONFERENCE`          | no       | empty                         |
    /// | `STRIPE_PRODUCT_COMBINED`            | no       | empty                         |
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").ok()?;
        Some(Self {
            secret_key,
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            success_url: std::env::var("STRIPE_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:5173/success".into()),
            cancel_url: std::env::var("STRIPE_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            catalog: ProductCatalog {
                membership_xsmall: env_or_empty("STRIPE_PRODUCT_MEMBERSHIP_XSMALL"),
                membership_small: env_or_empty("STRIPE_PRODUCT_MEMBERSHIP_SMALL"),
                membership_medium: env_or_empty("STRIPE_PRODUCT_MEMBERSHIP_MEDIUM"),
                membership_large: env_or_empty("STRIPE_PRODUCT_MEMBERSHIP_LARGE"),
                membership_xlarge: env_or_empty("STRIPE_PRODUCT_MEMBERSHIP_XLARGE"),
                conference: env_or_empty("STRIPE_PRODUCT_CONFERENCE"),
                combined: env_or_empty("STRIPE_PRODUCT_COMBINED"),
            },
        })
    }
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}
