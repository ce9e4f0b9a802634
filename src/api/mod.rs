//! HTTP surface: application state, error envelope, and router assembly.
//!
//! Handlers are stateless request/response adapters; all state lives in the
//! injected configuration, the datastore, and the content store. Error
//! responses carry a single `{"error": "..."}` JSON body.

mod chat;
mod comments;
mod content;
mod likes;
mod performance;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::content::ContentStore;
use crate::db::Database;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when the datastore is unconfigured; comment/like handlers
    /// degrade per the fail-soft policy.
    pub db: Option<Database>,
    pub content: Arc<ContentStore>,
}

impl AppState {
    /// Assemble state from configuration. A datastore that fails to open is
    /// treated the same as an unconfigured one: warn and degrade, never
    /// crash startup.
    pub fn from_config(config: Config) -> Self {
        let db = config.database_path.as_deref().and_then(|path| {
            Database::new(path)
                .map_err(|e| {
                    warn!(
                        "Failed to open datastore at {}: {:#}; comments and likes are disabled",
                        path, e
                    );
                })
                .ok()
        });

        let content = Arc::new(ContentStore::new(&config));

        Self {
            config: Arc::new(config),
            db,
            content,
        }
    }
}

/// API error taxonomy, mapped to status codes and a JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required request fields missing or invalid
    #[error("{0}")]
    Validation(String),
    /// Requested slug/id does not exist in its source
    #[error("{0}")]
    NotFound(String),
    /// Duplicate like; the frontend contract expects 400 here
    #[error("{0}")]
    Conflict(String),
    /// A write was requested but the backing store is unconfigured
    #[error("{0}")]
    Unavailable(String),
    /// A write failed upstream; writes cannot be silently dropped
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Unwrap a required request field, trimming whitespace.
pub(crate) fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{} is required", name)))
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Light shape check for author/requester emails.
pub(crate) fn valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
        .is_match(email)
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // The website frontend is a cross-origin consumer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/likes", get(likes::get_likes).post(likes::toggle_like))
        .route("/ai-chat", post(chat::ai_chat))
        .route(
            "/performance",
            get(performance::get_diagnostics).post(performance::ingest_metric),
        )
        .route("/blog", get(content::list_blog))
        .route("/news", get(content::list_news))
        .route("/posts", get(content::list_posts))
        .route("/use-cases", get(content::list_use_cases));

    // Localized page-data routes: locale comes from the first path segment
    let page_routes = Router::new()
        .route("/:locale/blog", get(content::blog_page))
        .route("/:locale/blog/:slug", get(content::blog_item_page))
        .route("/:locale/news", get(content::news_page))
        .route("/:locale/news/:slug", get(content::news_item_page))
        .route("/:locale/use-cases", get(content::use_cases_page))
        .route("/:locale/use-cases/:slug", get(content::use_case_item_page));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
