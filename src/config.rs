//! Process configuration, derived once from the environment at startup.
//!
//! Every external backend (CMS, datastore, AI provider) is optional: a
//! missing credential flips the matching capability flag instead of failing
//! startup, and the request path degrades gracefully (empty listings, zero
//! counts, canned chat replies). The `Config` value is immutable for the
//! process lifetime and injected into components via application state.

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    // CMS
    pub cms_project_id: Option<String>,
    pub cms_dataset: String,
    /// Explicit query API base URL; overrides the project-derived URL.
    /// Primarily used by tests to point the client at a mock server.
    pub cms_api_base: Option<String>,

    // Datastore (comments, likes)
    pub database_path: Option<String>,

    // AI chat
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,

    // Static Markdown content
    pub content_dir: String,
    pub default_page_size: usize,

    // Server
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Never fails: absent backend credentials leave the corresponding
    /// feature unconfigured rather than aborting startup.
    pub fn from_env() -> Self {
        Self {
            cms_project_id: read_non_empty("CMS_PROJECT_ID"),
            cms_dataset: std::env::var("CMS_DATASET")
                .unwrap_or_else(|_| "production".to_string()),
            cms_api_base: read_non_empty("CMS_API_BASE"),

            database_path: read_non_empty("DATABASE_PATH"),

            openai_api_key: read_non_empty("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_base: std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),

            content_dir: std::env::var("CONTENT_DIR").unwrap_or_else(|_| "content".to_string()),
            default_page_size: std::env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Whether the hosted CMS can be queried.
    pub fn cms_configured(&self) -> bool {
        self.cms_project_id.is_some() || self.cms_api_base.is_some()
    }

    /// Whether the comments/likes datastore is available.
    pub fn database_configured(&self) -> bool {
        self.database_path.is_some()
    }

    /// Whether the AI chat provider can be called.
    pub fn ai_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Full query endpoint URL for the CMS, or `None` when unconfigured.
    pub fn cms_query_url(&self) -> Option<String> {
        if let Some(base) = &self.cms_api_base {
            return Some(format!(
                "{}/v2024-01-01/data/query/{}",
                base.trim_end_matches('/'),
                self.cms_dataset
            ));
        }
        self.cms_project_id.as_ref().map(|project| {
            format!(
                "https://{}.api.sanity.io/v2024-01-01/data/query/{}",
                project, self.cms_dataset
            )
        })
    }

    /// Warn once, at startup, about every unconfigured backend. Request
    /// handlers degrade silently afterwards.
    pub fn log_backend_status(&self) {
        if !self.cms_configured() {
            warn!("CMS not configured (CMS_PROJECT_ID); blog and news listings will be empty");
        }
        if !self.database_configured() {
            warn!("Datastore not configured (DATABASE_PATH); comments and likes are disabled");
        }
        if !self.ai_configured() {
            warn!("AI provider not configured (OPENAI_API_KEY); chat will use canned replies");
        }
    }
}

/// Read an env var, treating empty strings the same as unset.
fn read_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
