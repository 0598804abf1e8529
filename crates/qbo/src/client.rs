//! REST client for the accounting company API.
//!
//! All reads go through the SQL-ish `query` endpoint or direct entity GETs,
//! with `minorversion=65` pinned the way the production integration expects.

use serde::Deserialize;

use crate::config::QboConfig;

/// API minor version appended to every request.
const MINOR_VERSION: &str = "65";

/// Errors from the accounting REST layer.
#[derive(Debug, thiserror::Error)]
pub enum QboError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The accounting API returned a non-2xx status code.
    #[error("Accounting API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },
}

/// A service/non-inventory item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type", default)]
    pub item_type: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub income_account_ref: Option<AccountRef>,
}

/// Reference to an income account on an item.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A sales-tax code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxCode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Company profile, used as a token-health probe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyInfo {
    pub company_name: String,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    #[serde(rename = "QueryResponse", default)]
    query_response: QueryResponse,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(rename = "Item", default)]
    item: Vec<Item>,
    #[serde(rename = "TaxCode", default)]
    tax_code: Vec<TaxCode>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    #[serde(rename = "Item")]
    item: Item,
}

#[derive(Debug, Deserialize)]
struct CompanyInfoEnvelope {
    #[serde(rename = "CompanyInfo")]
    company_info: CompanyInfo,
}

/// HTTP client for one accounting company.
pub struct QboClient {
    client: reqwest::Client,
    config: QboConfig,
}

impl QboClient {
    pub fn new(config: QboConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &QboConfig {
        &self.config
    }

    /// List service and non-inventory items (first 100).
    pub async fn list_items(&self) -> Result<Vec<Item>, QboError> {
        let envelope = self
            .query("SELECT * FROM Item WHERE Type = 'Service' OR Type = 'NonInventory' MAXRESULTS 100")
            .await?;
        tracing::info!(count = envelope.query_response.item.len(), "Fetched accounting items");
        Ok(envelope.query_response.item)
    }

    /// List sales-tax codes (first 100).
    pub async fn list_tax_codes(&self) -> Result<Vec<TaxCode>, QboError> {
        let envelope = self.query("SELECT * FROM TaxCode MAXRESULTS 100").await?;
        tracing::info!(
            count = envelope.query_response.tax_code.len(),
            "Fetched accounting tax codes"
        );
        Ok(envelope.query_response.tax_code)
    }

    /// Probe a specific item id. Upstream rejections (missing item,
    /// stale token) are reported as `None` rather than an error so the
    /// diagnostics endpoint can render an "exists: false" verdict.
    pub async fn get_item(&self, item_id: &str) -> Result<Option<Item>, QboError> {
        let url = format!(
            "{}/v3/company/{}/item/{item_id}?minorversion={MINOR_VERSION}",
            self.config.base_url, self.config.company_id
        );
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(item_id, status, body = %body, "Item probe rejected");
            return Ok(None);
        }

        let envelope = response.json::<ItemEnvelope>().await?;
        Ok(Some(envelope.item))
    }

    /// Fetch the company profile; a cheap access-token health check.
    pub async fn company_info(&self) -> Result<CompanyInfo, QboError> {
        let url = format!(
            "{}/v3/company/{}/companyinfo/{}",
            self.config.base_url, self.config.company_id, self.config.company_id
        );
        let response = self.get(&url).await?;
        let envelope: CompanyInfoEnvelope = Self::parse_response(response).await?;
        Ok(envelope.company_info)
    }

    // ---- private helpers ----

    async fn query(&self, sql: &str) -> Result<QueryEnvelope, QboError> {
        let url = format!(
            "{}/v3/company/{}/query",
            self.config.base_url, self.config.company_id
        );
        let response = self
            .client
            .get(url)
            .query(&[("query", sql), ("minorversion", MINOR_VERSION)])
            .bearer_auth(&self.config.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, QboError> {
        Ok(self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .header("Accept", "application/json")
            .send()
            .await?)
    }

    /// Ensure the response has a success status code, then parse JSON.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, QboError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(QboError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
