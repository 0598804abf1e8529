//! Read-only accounting diagnostics: item and tax-code listings rendered as
//! HTML tables for manual inspection, plus a JSON probe for a single item id.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};

use renewal_qbo::{Item, TaxCode};

use crate::error::AppResult;
use crate::html;
use crate::state::AppState;

/// GET /api/qbo/items
pub async fn list_items(State(state): State<AppState>) -> AppResult<Html<String>> {
    let qbo = state.qbo()?.clone();

    let mut items = qbo.list_items().await?;
    items.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Html(render_items_page(&items)))
}

/// GET /api/qbo/tax-codes
pub async fn list_tax_codes(State(state): State<AppState>) -> AppResult<Html<String>> {
    let qbo = state.qbo()?.clone();

    let mut codes = qbo.list_tax_codes().await?;
    codes.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Html(render_tax_codes_page(&codes)))
}

/// GET /api/qbo/items/{id}
///
/// Probe whether a specific item id exists and is accessible. Upstream
/// rejections are reported in the verdict, not as request failures, so the
/// page is usable while credentials are being sorted out.
pub async fn probe_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<Value>> {
    let qbo = state.qbo()?.clone();

    tracing::info!(item_id, "Probing accounting item");

    match qbo.get_item(&item_id).await? {
        Some(item) => Ok(Json(json!({
            "exists": true,
            "itemId": item_id,
            "item": {
                "id": item.id,
                "name": item.name,
                "type": item.item_type,
                "active": item.active,
                "description": item.description.unwrap_or_default(),
                "unitPrice": item.unit_price.unwrap_or(0.0),
                "incomeAccountRef": item.income_account_ref.map(|r| json!({
                    "value": r.value,
                    "name": r.name,
                })),
            },
        }))),
        None => Ok(Json(json!({
            "exists": false,
            "itemId": item_id,
            "error": "Item not found or inaccessible",
        }))),
    }
}

fn render_items_page(items: &[Item]) -> String {
    let mut rows = String::new();
    for item in items {
        let row_class = if item.active { "" } else { " class=\"inactive\"" };
        let status = if item.active { "Active" } else { "Inactive" };
        rows.push_str(&format!(
            "<tr{row_class}><td><code>{}</code></td><td>{}</td><td>{}</td><td>${:.2}</td><td>{}</td><td>{status}</td></tr>\n",
            html::escape(&item.id),
            html::escape(&item.name),
            html::escape(&item.item_type),
            item.unit_price.unwrap_or(0.0),
            html::escape(
                item.income_account_ref
                    .as_ref()
                    .and_then(|r| r.name.as_deref())
                    .unwrap_or("")
            ),
        ));
    }

    let body = format!(
        r#"<h1>QuickBooks Items</h1>
<p>Found <strong>{count}</strong> items in the accounting system.</p>
<table>
  <thead>
    <tr><th>Item ID</th><th>Name</th><th>Type</th><th>Unit Price</th><th>Income Account</th><th>Status</th></tr>
  </thead>
  <tbody>
{rows}  </tbody>
</table>
"#,
        count = items.len(),
    );
    html::page("QuickBooks Items", &body)
}

fn render_tax_codes_page(codes: &[TaxCode]) -> String {
    let mut rows = String::new();
    for code in codes {
        let row_class = if code.active { "" } else { " class=\"inactive\"" };
        let status = if code.active { "Active" } else { "Inactive" };
        rows.push_str(&format!(
            "<tr{row_class}><td><code>{}</code></td><td>{}</td><td>{}</td><td>{status}</td></tr>\n",
            html::escape(&code.id),
            html::escape(&code.name),
            html::escape(code.description.as_deref().unwrap_or("")),
        ));
    }

    let body = format!(
        r#"<h1>QuickBooks Tax Codes</h1>
<p>Found <strong>{count}</strong> tax codes in the accounting system.</p>
<table>
  <thead>
    <tr><th>Tax Code ID</th><th>Name</th><th>Description</th><th>Status</th></tr>
  </thead>
  <tbody>
{rows}  </tbody>
</table>
"#,
        count = codes.len(),
    );
    html::page("QuickBooks Tax Codes", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_page_renders_rows_and_escapes_names() {
        let items = vec![Item {
            id: "200000404".into(),
            name: "Membership <Small>".into(),
            item_type: "Service".into(),
            active: false,
            description: None,
            unit_price: Some(1000.0),
            income_account_ref: None,
        }];
        let page = render_items_page(&items);
        assert!(page.contains("Found <strong>1</strong>"));
        assert!(page.contains("Membership &lt;Small&gt;"));
        assert!(page.contains("class=\"inactive\""));
        assert!(page.contains("$1000.00"));
    }

    #[test]
    fn tax_codes_page_renders_rows() {
        let codes = vec![TaxCode {
            id: "13".into(),
            name: "HST ON".into(),
            description: Some("Ontario 13%".into()),
            active: true,
        }];
        let page = render_tax_codes_page(&codes);
        assert!(page.contains("<code>13</code>"));
        assert!(page.contains("HST ON"));
        assert!(page.contains("Ontario 13%"));
    }
}
