//! Accounting-system configuration loaded from environment variables.

/// Default production API base; sandbox companies override via `QBO_BASE_URL`.
const DEFAULT_BASE_URL: &str = "https://quickbooks.api.intuit.com";

/// Default OAuth2 token endpoint.
const DEFAULT_TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";

/// Credentials for authenticated accounting API calls.
#[derive(Debug, Clone)]
pub struct QboConfig {
    pub access_token: String,
    pub company_id: String,
    pub base_url: String,
}

impl QboConfig {
    /// Load from environment. Returns `None` unless both `QBO_ACCESS_TOKEN`
    /// and `QBO_COMPANY_ID` are present.
    pub fn from_env() -> Option<Self> {
        let access_token = std::env::var("QBO_ACCESS_TOKEN").ok()?;
        let company_id = std::env::var("QBO_COMPANY_ID").ok()?;
        Some(Self {
            access_token,
            company_id,
            base_url: std::env::var("QBO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
        })
    }
}

/// OAuth2 app credentials for token exchange and refresh.
#[derive(Debug, Clone)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl OauthConfig {
    /// Load from environment. Returns `None` unless both `QBO_CLIENT_ID`
    /// and `QBO_CLIENT_SECRET` are present.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("QBO_CLIENT_ID").ok()?;
        let client_secret = std::env::var("QBO_CLIENT_SECRET").ok()?;
        Some(Self {
            client_id,
            client_secret,
            token_url: std::env::var("QBO_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
        })
    }
}
