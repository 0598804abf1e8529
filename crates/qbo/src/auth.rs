//! OAuth2 token exchange and refresh against the accounting platform.

use serde::Deserialize;

use crate::client::QboError;
use crate::config::OauthConfig;

/// Tokens returned by the OAuth2 token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    /// Lifetime of the refresh token itself, when reported.
    #[serde(default)]
    pub x_refresh_token_expires_in: Option<i64>,
}

/// Client for the OAuth2 token endpoint (HTTP basic auth with the app's
/// client id/secret).
pub struct QboOauthClient {
    client: reqwest::Client,
    config: OauthConfig,
}

impl QboOauthClient {
    pub fn new(config: OauthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Exchange an authorization code for an access/refresh token pair.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, QboError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Refresh an access token. The stored refresh token is trimmed first:
    /// stray whitespace from copy-pasted env values breaks the grant.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, QboError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.trim()),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, QboError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "OAuth token request rejected");
            return Err(QboError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let tokens = response.json::<TokenSet>().await?;
        tracing::info!(expires_in = tokens.expires_in, "OAuth tokens received");
        Ok(tokens)
    }
}
