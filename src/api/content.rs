//! Content endpoints.
//!
//! Two families share the same pipeline (resolve locale, fetch from the
//! canonical source, merge localized fields):
//!
//! - `/api/{blog,news,posts,use-cases}?locale=&limit=` listing endpoints for
//!   the frontend's data fetches;
//! - `/:locale/...` page-data routes, where the locale comes from the first
//!   URL path segment and an unknown slug is a 404.

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::content::{ContentType, ResolvedItem, ResolvedSummary};
use crate::locale::{resolve_locale, Locale};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    locale: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    locale: &'static str,
    items: Vec<ResolvedSummary>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    locale: &'static str,
    item: ResolvedItem,
}

async fn list_content(
    state: &AppState,
    kind: ContentType,
    params: ListParams,
) -> Json<ListingResponse> {
    let locale = params
        .locale
        .as_deref()
        .map(Locale::from_code_or_default)
        .unwrap_or_default();

    let items = state.content.list(kind, locale, params.limit).await;

    Json(ListingResponse {
        locale: locale.code(),
        items: items.iter().map(|item| item.summary(locale)).collect(),
    })
}

/// GET /api/blog - CMS-backed blog listing.
pub async fn list_blog(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ListingResponse> {
    list_content(&state, ContentType::Blog, params).await
}

/// GET /api/news - CMS-backed news listing.
pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ListingResponse> {
    list_content(&state, ContentType::News, params).await
}

/// GET /api/posts - Markdown-backed localized posts.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ListingResponse> {
    list_content(&state, ContentType::Post, params).await
}

/// GET /api/use-cases - Markdown-backed use cases.
pub async fn list_use_cases(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ListingResponse> {
    list_content(&state, ContentType::UseCase, params).await
}

// ==================== Localized page-data routes ====================

async fn page_listing(state: &AppState, kind: ContentType, uri: &Uri) -> Json<ListingResponse> {
    let locale = resolve_locale(uri.path());
    let items = state.content.list(kind, locale, None).await;

    Json(ListingResponse {
        locale: locale.code(),
        items: items.iter().map(|item| item.summary(locale)).collect(),
    })
}

async fn page_item(
    state: &AppState,
    kind: ContentType,
    uri: &Uri,
    slug: &str,
) -> Result<Json<ItemResponse>, ApiError> {
    let locale = resolve_locale(uri.path());

    let item = state
        .content
        .get(kind, slug, locale)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No content found for slug \"{}\"", slug)))?;

    Ok(Json(ItemResponse {
        locale: locale.code(),
        item: item.resolve(locale),
    }))
}

/// GET /:locale/blog
pub async fn blog_page(State(state): State<AppState>, uri: Uri) -> Json<ListingResponse> {
    page_listing(&state, ContentType::Blog, &uri).await
}

/// GET /:locale/blog/:slug
pub async fn blog_item_page(
    State(state): State<AppState>,
    Path((_locale, slug)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<ItemResponse>, ApiError> {
    page_item(&state, ContentType::Blog, &uri, &slug).await
}

/// GET /:locale/news
pub async fn news_page(State(state): State<AppState>, uri: Uri) -> Json<ListingResponse> {
    page_listing(&state, ContentType::News, &uri).await
}

/// GET /:locale/news/:slug
pub async fn news_item_page(
    State(state): State<AppState>,
    Path((_locale, slug)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<ItemResponse>, ApiError> {
    page_item(&state, ContentType::News, &uri, &slug).await
}

/// GET /:locale/use-cases
pub async fn use_cases_page(State(state): State<AppState>, uri: Uri) -> Json<ListingResponse> {
    page_listing(&state, ContentType::UseCase, &uri).await
}

/// GET /:locale/use-cases/:slug
pub async fn use_case_item_page(
    State(state): State<AppState>,
    Path((_locale, slug)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<ItemResponse>, ApiError> {
    page_item(&state, ContentType::UseCase, &uri, &slug).await
}
