//! JSON property builders and extractors for workspace-database pages.
//!
//! The page API nests every value inside a typed envelope
//! (`{"rich_text": [{"text": {"content": ...}}]}` and friends). These helpers
//! keep the handler code free of that ceremony.

use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// A title property value.
pub fn title(content: &str) -> Value {
    json!({ "title": [{ "text": { "content": content } }] })
}

/// A rich-text property value.
pub fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

/// A URL property value.
pub fn url(href: &str) -> Value {
    json!({ "url": href })
}

/// A select property value.
pub fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

/// A status property value.
pub fn status(name: &str) -> Value {
    json!({ "status": { "name": name } })
}

/// A multi-select property value.
pub fn multi_select(names: &[&str]) -> Value {
    let options: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
    json!({ "multi_select": options })
}

/// A date property value (ISO 8601 start).
pub fn date(start: &str) -> Value {
    json!({ "date": { "start": start } })
}

/// A rich-text `equals` filter on the given property.
pub fn rich_text_equals(property: &str, value: &str) -> Value {
    json!({ "property": property, "rich_text": { "equals": value } })
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// Plain text of a title property on a page object, if present.
pub fn title_text<'a>(page: &'a Value, property: &str) -> Option<&'a str> {
    page.get("properties")?
        .get(property)?
        .get("title")?
        .get(0)?
        .get("text")?
        .get("content")?
        .as_str()
}

/// Plain text of a rich-text property on a page object, if present.
pub fn rich_text_text<'a>(page: &'a Value, property: &str) -> Option<&'a str> {
    page.get("properties")?
        .get(property)?
        .get("rich_text")?
        .get(0)?
        .get("text")?
        .get("content")?
        .as_str()
}

/// Page id of the first relation entry on a relation property, if any.
pub fn first_relation_id<'a>(page: &'a Value, property: &str) -> Option<&'a str> {
    page.get("properties")?
        .get(property)?
        .get("relation")?
        .get(0)?
        .get("id")?
        .as_str()
}
