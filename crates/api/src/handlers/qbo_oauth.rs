//! OAuth2 callback for the accounting integration.
//!
//! The accounting platform redirects here with an authorization code and the
//! company (realm) id. The code is exchanged for tokens, which are returned
//! as JSON for programmatic callers or rendered as an HTML page for manual
//! copy into the deployment's environment variables.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use renewal_qbo::TokenSet;

use crate::error::{AppError, AppResult};
use crate::html;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OauthCallbackQuery {
    pub code: Option<String>,
    #[serde(rename = "realmId")]
    pub realm_id: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /api/qbo/oauth-callback
pub async fn oauth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OauthCallbackQuery>,
) -> AppResult<Response> {
    tracing::info!("OAuth callback received");

    if let Some(error) = &query.error {
        let detail = query.error_description.as_deref().unwrap_or(error);
        tracing::warn!(error, detail, "OAuth authorization failed");
        return Err(AppError::BadRequest(format!(
            "OAuth authorization failed: {detail}"
        )));
    }

    let (Some(code), Some(realm_id)) = (query.code.as_deref(), query.realm_id.as_deref()) else {
        return Err(AppError::BadRequest(
            "Authorization code and realm ID are required".into(),
        ));
    };

    let oauth = state.qbo_oauth()?.clone();
    let redirect_uri = format!("{}/api/qbo/oauth-callback", state.config.public_base_url);

    tracing::info!("Exchanging authorization code for tokens");
    let tokens = oauth.exchange_code(code, &redirect_uri).await?;

    let wants_json = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        Ok(Json(json!({
            "success": true,
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
            "realmId": realm_id,
            "expiresIn": tokens.expires_in,
            "tokenType": tokens.token_type,
        }))
        .into_response())
    } else {
        Ok(Html(render_success_page(realm_id, &tokens)).into_response())
    }
}

/// HTML page for manually copying the credentials into the environment.
fn render_success_page(realm_id: &str, tokens: &TokenSet) -> String {
    let body = format!(
        r#"<div class="success">
  <h1>QuickBooks Authentication Successful</h1>
  <p><strong>Realm ID (Company ID):</strong> <code>{realm}</code></p>
  <p><strong>Token Type:</strong> {token_type}</p>
  <p><strong>Expires In:</strong> {hours} hours</p>

  <h2>Update These Environment Variables:</h2>

  <h3>1. QBO_ACCESS_TOKEN</h3>
  <pre>{access}</pre>

  <h3>2. QBO_REFRESH_TOKEN</h3>
  <pre>{refresh}</pre>

  <h3>3. QBO_COMPANY_ID</h3>
  <pre>{realm}</pre>

  <h2>Next Steps:</h2>
  <ol>
    <li>Update the three variables above in the deployment environment</li>
    <li>Redeploy the application for the changes to take effect</li>
  </ol>
</div>
"#,
        realm = html::escape(realm_id),
        token_type = html::escape(&tokens.token_type),
        hours = tokens.expires_in / 3600,
        access = html::escape(&tokens.access_token),
        refresh = html::escape(&tokens.refresh_token),
    );
    html::page("QuickBooks OAuth - Success", &body)
}
