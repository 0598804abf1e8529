//! Accounting credential health endpoints.
//!
//! Both endpoints always answer 200 with a JSON report: they exist to debug
//! broken configuration, so they must not themselves fail on it. The status
//! endpoint checks the access token against the company-info API; the
//! diagnose endpoint inspects credential shape and runs a live token-refresh
//! test against the OAuth platform.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use renewal_qbo::QboError;

use crate::state::AppState;

/// GET /api/qbo/token-status
pub async fn token_status(State(state): State<AppState>) -> Json<Value> {
    let environment = json!({
        "QBO_ACCESS_TOKEN": env_report("QBO_ACCESS_TOKEN"),
        "QBO_REFRESH_TOKEN": env_report("QBO_REFRESH_TOKEN"),
        "QBO_CLIENT_ID": env_report("QBO_CLIENT_ID"),
        "QBO_CLIENT_SECRET": env_report("QBO_CLIENT_SECRET"),
        "QBO_COMPANY_ID": env_report("QBO_COMPANY_ID"),
    });

    let token_test = match &state.qbo {
        Some(qbo) => match qbo.company_info().await {
            Ok(info) => json!({
                "status": "VALID",
                "message": "Access token is working",
                "company_name": info.company_name,
            }),
            Err(QboError::Api { status: 401, .. }) => json!({
                "status": "INVALID",
                "http_status": 401,
                "message": "Access token expired - needs refresh",
            }),
            Err(err) => json!({
                "status": "ERROR",
                "message": format!("Failed to test token: {err}"),
            }),
        },
        None => json!({
            "status": "CANNOT_TEST",
            "message": "Missing QBO_ACCESS_TOKEN or QBO_COMPANY_ID",
        }),
    };

    let mut warnings: Vec<Value> = Vec::new();
    if token_test["status"] != "VALID" {
        warnings.push(json!({
            "level": "CRITICAL",
            "message": "QuickBooks access token is invalid or expired",
            "action": "Re-authenticate via the OAuth callback and update the environment",
        }));
    }
    if std::env::var("QBO_REFRESH_TOKEN").is_err() {
        warnings.push(json!({
            "level": "CRITICAL",
            "message": "No refresh token available - cannot refresh",
            "action": "Re-authenticate via the OAuth callback",
        }));
    }

    Json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment_variables": environment,
        "token_test": token_test,
        "warnings": warnings,
    }))
}

/// GET /api/qbo/diagnose
pub async fn diagnose(State(state): State<AppState>) -> Json<Value> {
    let client_id = std::env::var("QBO_CLIENT_ID").ok();
    let client_secret = std::env::var("QBO_CLIENT_SECRET").ok();
    let refresh_token = std::env::var("QBO_REFRESH_TOKEN").ok();
    let access_token = std::env::var("QBO_ACCESS_TOKEN").ok();
    let company_id = std::env::var("QBO_COMPANY_ID").ok();
    let base_url = std::env::var("QBO_BASE_URL")
        .unwrap_or_else(|_| "https://quickbooks.api.intuit.com".into());

    let configuration = json!({
        "client_id": credential_report(client_id.as_deref(), 20),
        "client_secret": credential_report(client_secret.as_deref(), 20),
        "refresh_token": credential_report(refresh_token.as_deref(), 50),
        "access_token": credential_report(access_token.as_deref(), 50),
        "company_id": {
            "present": company_id.is_some(),
            "value": company_id.as_deref().unwrap_or("MISSING"),
        },
        "base_url": {
            "value": base_url,
            "is_sandbox": base_url.contains("sandbox"),
        },
    });

    let token_refresh_test = match (&state.qbo_oauth, refresh_token.as_deref()) {
        (Some(oauth), Some(token)) => match oauth.refresh(token).await {
            Ok(tokens) => json!({
                "success": true,
                "message": "Token refresh works",
                "new_token_received": !tokens.access_token.is_empty(),
                "expires_in": tokens.expires_in,
            }),
            Err(QboError::Api { status, body }) => refresh_failure_report(status, &body),
            Err(err) => json!({
                "success": false,
                "error": "Network or system error",
                "message": err.to_string(),
            }),
        },
        _ => json!({
            "success": false,
            "error": "Missing required credentials",
            "message": "Cannot test - QBO_CLIENT_ID, QBO_CLIENT_SECRET, or QBO_REFRESH_TOKEN not set",
        }),
    };

    let mut recommendations: Vec<String> = Vec::new();
    if configuration["client_id"]["looks_valid"] != true {
        recommendations
            .push("Client ID looks invalid - check for truncation or extra spaces".into());
    }
    if configuration["client_secret"]["looks_valid"] != true {
        recommendations
            .push("Client Secret looks invalid - check for truncation or extra spaces".into());
    }
    if configuration["refresh_token"]["has_whitespace"] == true {
        recommendations.push(
            "Refresh token contains whitespace - this will cause failures! Remove spaces/newlines."
                .into(),
        );
    }
    if token_refresh_test["success"] != true {
        recommendations.push("Re-authenticate via the OAuth callback".into());
    }

    Json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "configuration": configuration,
        "token_refresh_test": token_refresh_test,
        "recommendations": recommendations,
    }))
}

/// Presence report for one environment variable (no value leakage).
fn env_report(name: &str) -> Value {
    match std::env::var(name) {
        Ok(value) => json!({ "set": true, "length": value.len() }),
        Err(_) => json!({ "set": false }),
    }
}

/// Shape report for a credential: presence, length, redacted preview,
/// whitespace problems, and a plausibility check against `min_len`.
fn credential_report(value: Option<&str>, min_len: usize) -> Value {
    match value {
        Some(v) => json!({
            "present": true,
            "length": v.len(),
            "preview": preview(v),
            "looks_valid": v.len() > min_len && !v.contains(' '),
            "has_whitespace": v.chars().any(char::is_whitespace),
        }),
        None => json!({
            "present": false,
            "length": 0,
            "preview": "MISSING",
            "looks_valid": false,
            "has_whitespace": false,
        }),
    }
}

/// Redacted preview: first ten characters at most.
fn preview(value: &str) -> String {
    let head: String = value.chars().take(10).collect();
    if value.len() > 10 {
        format!("{head}...")
    } else {
        head
    }
}

/// Interpret a rejected refresh grant, listing likely causes.
fn refresh_failure_report(status: u16, body: &str) -> Value {
    let error_code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown".into());

    let possible_causes: Vec<&str> = match error_code.as_str() {
        "invalid_grant" => vec![
            "Refresh token is invalid, expired, or revoked",
            "Client ID/Secret don't match the app that issued the token",
            "Token issued for sandbox but production credentials in use (or vice versa)",
            "App may have been disconnected from the company settings",
        ],
        "invalid_client" => vec![
            "Client ID or Client Secret is wrong",
            "Credentials may have extra spaces or newlines",
        ],
        _ => vec![],
    };

    json!({
        "success": false,
        "http_status": status,
        "error": error_code,
        "error_description": body,
        "possible_causes": possible_causes,
    })
}
