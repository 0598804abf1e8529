//! Inline HTML rendering for the diagnostics pages.
//!
//! The listing and OAuth pages are meant for manual inspection in a browser,
//! so they ship a small shared stylesheet and no client-side framework.

/// Shared stylesheet for every diagnostics page.
const STYLE: &str = r#"
  body { font-family: system-ui; max-width: 1200px; margin: 50px auto; padding: 20px; }
  h1 { color: #2d7a3e; }
  table { width: 100%; border-collapse: collapse; margin-top: 20px; }
  th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
  th { background: #f5f5f5; font-weight: 600; position: sticky; top: 0; }
  tr:hover { background: #f9f9f9; }
  .inactive { color: #999; }
  .success { background: #d4edda; color: #155724; padding: 20px; border-radius: 8px; }
  .error { background: #f8d7da; color: #721c24; padding: 20px; border-radius: 8px; }
  .info { background: #d1ecf1; color: #0c5460; padding: 15px; border-radius: 5px; margin: 20px 0; }
  code { background: #f5f5f5; padding: 2px 6px; border-radius: 3px; font-family: monospace; }
  pre { background: #f5f5f5; padding: 15px; border-radius: 5px; overflow-x: auto; white-space: pre-wrap; word-wrap: break-word; }
"#;

/// Wrap a body fragment in the standard page scaffold.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

/// Escape a value for interpolation into HTML text or attributes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape("<script>&\"'"), "&lt;script&gt;&amp;&quot;&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn page_includes_title_and_body() {
        let html = page("Items", "<h1>Items</h1>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Items</title>"));
        assert!(html.contains("<h1>Items</h1>"));
    }
}
