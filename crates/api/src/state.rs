use std::sync::Arc;

use renewal_mailer::{Mailer, MailerConfig};
use renewal_notion::{NotionClient, NotionConfig};
use renewal_qbo::{OauthConfig, QboClient, QboConfig, QboOauthClient};
use renewal_stripe::{StripeClient, StripeConfig};

use crate::config::ServerConfig;
use crate::error::AppError;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Each integration is `Option`: a missing credential is a per-request 500
/// diagnostic on the handlers that need it, not a startup crash, so the
/// diagnostics endpoints stay reachable while credentials are being fixed.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Payment-processor client.
    pub stripe: Option<Arc<StripeClient>>,
    /// Workspace-database client.
    pub notion: Option<Arc<NotionClient>>,
    /// Accounting-system client.
    pub qbo: Option<Arc<QboClient>>,
    /// Accounting OAuth token-endpoint client.
    pub qbo_oauth: Option<Arc<QboOauthClient>>,
    /// Email-provider client.
    pub mailer: Option<Arc<Mailer>>,
}

impl AppState {
    /// Build state from environment variables, constructing a client for
    /// each integration whose credentials are present.
    pub fn from_env(config: ServerConfig) -> Self {
        let stripe = StripeConfig::from_env().map(|c| Arc::new(StripeClient::new(c)));
        let notion = NotionConfig::from_env().map(|c| Arc::new(NotionClient::new(c)));
        let qbo = QboConfig::from_env().map(|c| Arc::new(QboClient::new(c)));
        let qbo_oauth = OauthConfig::from_env().map(|c| Arc::new(QboOauthClient::new(c)));
        let mailer = MailerConfig::from_env().map(|c| Arc::new(Mailer::new(c)));

        tracing::info!(
            stripe = stripe.is_some(),
            notion = notion.is_some(),
            qbo = qbo.is_some(),
            qbo_oauth = qbo_oauth.is_some(),
            mailer = mailer.is_some(),
            "Integrations configured"
        );

        Self {
            config: Arc::new(config),
            stripe,
            notion,
            qbo,
            qbo_oauth,
            mailer,
        }
    }

    /// Payment client, or a configuration error.
    pub fn stripe(&self) -> Result<&Arc<StripeClient>, AppError> {
        self.stripe
            .as_ref()
            .ok_or_else(|| AppError::Config("Stripe configuration missing".into()))
    }

    /// Workspace client, or a configuration error.
    pub fn notion(&self) -> Result<&Arc<NotionClient>, AppError> {
        self.notion
            .as_ref()
            .ok_or_else(|| AppError::Config("Workspace database configuration missing".into()))
    }

    /// Accounting client, or a configuration error.
    pub fn qbo(&self) -> Result<&Arc<QboClient>, AppError> {
        self.qbo
            .as_ref()
            .ok_or_else(|| AppError::Config("Missing QuickBooks credentials".into()))
    }

    /// Accounting OAuth client, or a configuration error.
    pub fn qbo_oauth(&self) -> Result<&Arc<QboOauthClient>, AppError> {
        self.qbo_oauth
            .as_ref()
            .ok_or_else(|| AppError::Config("QuickBooks credentials not configured".into()))
    }

    /// Mailer, or a configuration error.
    pub fn mailer(&self) -> Result<&Arc<Mailer>, AppError> {
        self.mailer
            .as_ref()
            .ok_or_else(|| AppError::Config("Email provider not configured".into()))
    }
}
