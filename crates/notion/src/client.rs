//! REST client for the workspace-database API.

use serde_json::{json, Value};

use crate::config::NotionConfig;
use crate::props;

/// API version header sent with every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Errors from the workspace-database REST layer.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The workspace API returned a non-2xx status code.
    #[error("Workspace API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// A required database id is not configured.
    #[error("Workspace database not configured: {0}")]
    MissingDatabase(&'static str),
}

/// HTTP client for one workspace integration.
pub struct NotionClient {
    client: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Raw page/database operations
    // -----------------------------------------------------------------------

    /// Update properties on an existing page.
    pub async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value, NotionError> {
        let response = self
            .client
            .patch(format!("{}/v1/pages/{page_id}", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Retrieve a page by id.
    pub async fn get_page(&self, page_id: &str) -> Result<Value, NotionError> {
        let response = self
            .client
            .get(format!("{}/v1/pages/{page_id}", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Query a database with a filter; returns the result pages.
    pub async fn query_database(&self, db_id: &str, filter: Value) -> Result<Vec<Value>, NotionError> {
        let response = self
            .client
            .post(format!("{}/v1/databases/{db_id}/query", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "filter": filter }))
            .send()
            .await?;

        let body: Value = Self::parse_response(response).await?;
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(results)
    }

    /// Create a page in a database.
    pub async fn create_page(&self, db_id: &str, properties: Value) -> Result<Value, NotionError> {
        let response = self
            .client
            .post(format!("{}/v1/pages", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "parent": { "database_id": db_id },
                "properties": properties,
            }))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // -----------------------------------------------------------------------
    // Renewal-flow operations
    // -----------------------------------------------------------------------

    /// Record a freshly created checkout session on the organization page so
    /// the webhook can correlate the payment later. The correlation token is
    /// the page id itself.
    pub async fn record_checkout_session(
        &self,
        token: &str,
        session_id: &str,
        qbo_invoice_id: Option<&str>,
        qbo_invoice_number: Option<&str>,
    ) -> Result<(), NotionError> {
        let mut properties = json!({
            "Stripe Session ID": props::rich_text(session_id),
        });
        if let Some(id) = qbo_invoice_id.filter(|s| !s.is_empty()) {
            properties["QB Invoice ID"] = props::rich_text(id);
        }
        if let Some(number) = qbo_invoice_number.filter(|s| !s.is_empty()) {
            properties["QB Invoice Number"] = props::rich_text(number);
        }

        self.update_page(token, properties).await?;
        tracing::info!(token, session_id, "Checkout session recorded on organization page");
        Ok(())
    }

    /// Record a confirmed payment: payment-intent reference, paid status,
    /// the member tag, and the payment date.
    pub async fn record_payment(
        &self,
        token: &str,
        session_id: &str,
        payment_intent: Option<&str>,
    ) -> Result<(), NotionError> {
        let reference = payment_intent.unwrap_or(session_id);
        let properties = json!({
            "Stripe Payment Intent": props::rich_text(reference),
            "Payment Status": props::select("Paid"),
            "Tags": props::multi_select(&[self.config.member_tag.as_str()]),
            "Payment Date": props::date(&chrono::Utc::now().to_rfc3339()),
        });

        self.update_page(token, properties).await?;
        tracing::info!(token, session_id, "Payment recorded on organization page");
        Ok(())
    }

    /// Find the organization page matching a correlation token.
    pub async fn find_organization_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Value>, NotionError> {
        let db_id = self
            .config
            .organizations_db_id
            .as_deref()
            .ok_or(NotionError::MissingDatabase("organizations"))?;

        let mut results = self
            .query_database(db_id, props::rich_text_equals("Token", token))
            .await?;
        if results.is_empty() {
            return Ok(None);
        }
        Ok(Some(results.remove(0)))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, then parse JSON.
    async fn parse_response(response: reqwest::Response) -> Result<Value, NotionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}
