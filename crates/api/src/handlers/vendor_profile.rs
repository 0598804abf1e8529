//! Vendor-profile submission.
//!
//! Looks up the organization page by its correlation token, resolves the
//! booth number through the organization's booth relation, and creates a
//! submission record with whatever optional fields the vendor filled in.

use axum::extract::State;
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

use renewal_notion::{props, NotionClient};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Booth number shown when the organization has no resolvable booth.
const BOOTH_TBD: &str = "TBD";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfileRequest {
    pub token: Option<String>,
    #[serde(default)]
    pub form_state: FormState,
    #[serde(default)]
    pub catalogue_state: CatalogueState,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub highlight_headline: Option<String>,
    pub highlight_description: Option<String>,
    pub highlight_deal: Option<String>,
    pub highlight_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueState {
    pub uploaded_url: Option<String>,
}

/// POST /api/vendor-profile
pub async fn submit_vendor_profile(
    State(state): State<AppState>,
    Json(request): Json<VendorProfileRequest>,
) -> AppResult<Json<Value>> {
    let notion = state.notion()?.clone();

    let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(AppError::BadRequest("Token is required".into()));
    };

    tracing::info!(token, "Creating vendor submission");

    let organization = notion
        .find_organization_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    if let Some(name) = props::title_text(&organization, "Organization") {
        tracing::info!(organization = name, "Found organization");
    }

    let booth_number = resolve_booth_number(&notion, &organization).await;
    tracing::info!(booth_number = %booth_number, "Resolved booth number");

    let submissions_db = notion
        .config()
        .submissions_db_id
        .clone()
        .ok_or_else(|| AppError::Config("Submissions database not configured".into()))?;

    let properties = build_submission_properties(token, &booth_number, &request);
    let submission = notion.create_page(&submissions_db, properties).await?;

    let submission_id = submission
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    tracing::info!(submission_id = %submission_id, "Vendor submission created");

    Ok(Json(json!({
        "success": true,
        "submissionId": submission_id,
        "message": "Vendor profile submitted for review!",
    })))
}

/// Follow the organization's booth relation and extract the leading booth
/// number from the booth page title. Any miss along the way yields `TBD`.
async fn resolve_booth_number(notion: &NotionClient, organization: &Value) -> String {
    let Some(relation_id) = props::first_relation_id(organization, "26 Booth Number") else {
        return BOOTH_TBD.into();
    };

    let booth_page = match notion.get_page(relation_id).await {
        Ok(page) => page,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to fetch booth page");
            return BOOTH_TBD.into();
        }
    };

    props::title_text(&booth_page, "Booth Number")
        .and_then(extract_booth_number)
        .unwrap_or_else(|| BOOTH_TBD.into())
}

/// Leading 1-3 digit booth number from a booth page title like
/// `"12 - Corner booth"`.
fn extract_booth_number(title: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\d{1,3})").expect("valid booth regex"));
    re.captures(title).map(|c| c[1].to_string())
}

/// Submission page properties: the fixed fields plus whatever the vendor
/// filled in.
fn build_submission_properties(
    token: &str,
    booth_number: &str,
    request: &VendorProfileRequest,
) -> Value {
    let mut properties = json!({
        "Token": props::title(token),
        "Booth Number": props::rich_text(booth_number),
        "Submission Date": props::date(&chrono::Utc::now().format("%Y-%m-%d").to_string()),
        "Status": props::status("Pending Review"),
    });

    let form = &request.form_state;
    let text_fields = [
        ("Company Name", &form.company_name),
        ("Company Description", &form.description),
        ("Highlight Product Name", &form.highlight_headline),
        ("Highlight Product Description", &form.highlight_description),
        ("Conference Special", &form.highlight_deal),
    ];
    for (property, value) in text_fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            properties[property] = props::rich_text(value);
        }
    }

    if let Some(website) = form.website.as_deref().filter(|v| !v.is_empty()) {
        properties["Website URL"] = props::url(website);
    }
    if let Some(category) = form.category.as_deref().filter(|v| !v.is_empty()) {
        properties["Primary Category"] = props::select(category);
    }
    if let Some(image) = form.highlight_image_url.as_deref().filter(|v| !v.is_empty()) {
        properties["Highlight Image URL"] = props::url(image);
    }
    if let Some(catalogue) = request
        .catalogue_state
        .uploaded_url
        .as_deref()
        .filter(|v| !v.is_empty())
    {
        properties["Catalogue"] = props::url(catalogue);
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booth_number_extracts_leading_digits() {
        assert_eq!(extract_booth_number("12 - Corner booth"), Some("12".into()));
        assert_eq!(extract_booth_number("104"), Some("104".into()));
        assert_eq!(extract_booth_number("1048 overflow"), Some("104".into()));
        assert_eq!(extract_booth_number("Booth 12"), None);
        assert_eq!(extract_booth_number(""), None);
    }

    #[test]
    fn submission_properties_include_fixed_fields() {
        let request = VendorProfileRequest {
            token: Some("tok_1".into()),
            form_state: FormState::default(),
            catalogue_state: CatalogueState::default(),
        };
        let properties = build_submission_properties("tok_1", "12", &request);
        assert_eq!(properties["Token"]["title"][0]["text"]["content"], "tok_1");
        assert_eq!(properties["Booth Number"]["rich_text"][0]["text"]["content"], "12");
        assert_eq!(properties["Status"]["status"]["name"], "Pending Review");
        assert!(properties.get("Company Name").is_none());
    }

    #[test]
    fn submission_properties_include_optional_fields_when_set() {
        let request = VendorProfileRequest {
            token: Some("tok_1".into()),
            form_state: FormState {
                company_name: Some("Example Vendor".into()),
                website: Some("https://vendor.example.test".into()),
                category: Some("Technology".into()),
                ..FormState::default()
            },
            catalogue_state: CatalogueState {
                uploaded_url: Some("https://files.example.test/catalogue.pdf".into()),
            },
        };
        let properties = build_submission_properties("tok_1", "TBD", &request);
        assert_eq!(
            properties["Company Name"]["rich_text"][0]["text"]["content"],
            "Example Vendor"
        );
        assert_eq!(properties["Website URL"]["url"], "https://vendor.example.test");
        assert_eq!(properties["Primary Category"]["select"]["name"], "Technology");
        assert_eq!(properties["Catalogue"]["url"], "https://files.example.test/catalogue.pdf");
    }
}
