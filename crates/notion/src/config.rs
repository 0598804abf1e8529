//! Workspace-database configuration loaded from environment variables.

/// Default API base; override with `NOTION_API_BASE` (tests point this at a
/// mock server).
const DEFAULT_API_BASE: &str = "https://api.notion.com";

/// Member tag applied to paid organizations when none is configured.
const DEFAULT_MEMBER_TAG: &str = "25/26 Member";

/// Configuration for the workspace-database integration.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration API key.
    pub api_key: String,
    /// Database holding vendor-profile submissions.
    pub submissions_db_id: Option<String>,
    /// Database holding organization pages (queried by correlation token).
    pub organizations_db_id: Option<String>,
    /// Multi-select tag applied to organizations once they have paid.
    pub member_tag: String,
    /// REST API base URL.
    pub api_base: String,
}

impl NotionConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `NOTION_API_KEY` is not set.
    ///
    /// | Variable                    | Required | Default                  |
    /// |-----------------------------|----------|--------------------------|
    /// | `NOTION_API_KEY`            | yes      | —                        |
    /// | `NOTION_SUBMISSIONS_DB_ID`  | no       | —                        |
    /// | `NOTION_ORGANIZATIONS_DB_ID`| no       | —                        |
    /// | `NOTION_MEMBER_TAG`         | no       | `25/26 Member`           |
    /// | `NOTION_API_BASE`           | no       | `https://api.notion.com` |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("NOTION_API_KEY").ok()?;
        Some(Self {
            api_key,
            submissions_db_id: std::env::var("NOTION_SUBMISSIONS_DB_ID").ok(),
            organizations_db_id: std::env::var("NOTION_ORGANIZATIONS_DB_ID").ok(),
            member_tag: std::env::var("NOTION_MEMBER_TAG")
                .unwrap_or_else(|_| DEFAULT_MEMBER_TAG.into()),
            api_base: std::env::var("NOTION_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
        })
    }
}
