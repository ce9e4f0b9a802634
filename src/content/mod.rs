//! Content model and source adapter.
//!
//! A `ContentItem` is a blog post, news article, static post, or use case:
//! stable slug, publish timestamp, author, categories, and localized
//! title/excerpt/body bundles. Items are authored externally (CMS documents
//! or Markdown files) and read-only here; a missing slug surfaces as `None`,
//! never an error.
//!
//! Each content type has exactly one canonical source: `blog` and `news` are
//! CMS documents, `posts` and `use-cases` live in the static Markdown tree.

mod cms;
mod markdown;

pub use cms::CmsClient;
pub use markdown::MarkdownSource;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::locale::{Locale, LocalizedText};

/// The content types served by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Blog articles (CMS)
    Blog,
    /// News announcements (CMS)
    News,
    /// Static localized posts (Markdown tree)
    Post,
    /// Customer use cases (Markdown tree)
    UseCase,
}

/// Where a content type's items physically live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// CMS document type name
    Cms(&'static str),
    /// Directory name under the content root
    Markdown(&'static str),
}

impl ContentType {
    /// The canonical source for this type.
    pub fn source(&self) -> ContentSource {
        match self {
            ContentType::Blog => ContentSource::Cms("post"),
            ContentType::News => ContentSource::Cms("news"),
            ContentType::Post => ContentSource::Markdown("posts"),
            ContentType::UseCase => ContentSource::Markdown("use-cases"),
        }
    }
}

/// A content item with localized field bundles.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub slug: String,
    pub published_at: DateTime<Utc>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub title: LocalizedText,
    pub excerpt: LocalizedText,
    pub body: LocalizedText,
}

/// Locale-resolved listing view: plain strings, no body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub published_at: DateTime<Utc>,
    pub author: Option<String>,
    pub categories: Vec<String>,
}

/// Locale-resolved detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub author: Option<String>,
    pub categories: Vec<String>,
}

impl ContentItem {
    /// Flatten localized fields into a listing view for `locale`. Each field
    /// falls back independently (locale → en → empty).
    pub fn summary(&self, locale: Locale) -> ResolvedSummary {
        ResolvedSummary {
            slug: self.slug.clone(),
            title: self.title.resolve(locale).to_string(),
            excerpt: self.excerpt.resolve(locale).to_string(),
            published_at: self.published_at,
            author: self.author.clone(),
            categories: self.categories.clone(),
        }
    }

    /// Flatten localized fields into a detail view for `locale`.
    pub fn resolve(&self, locale: Locale) -> ResolvedItem {
        ResolvedItem {
            slug: self.slug.clone(),
            title: self.title.resolve(locale).to_string(),
            excerpt: self.excerpt.resolve(locale).to_string(),
            body: self.body.resolve(locale).to_string(),
            published_at: self.published_at,
            author: self.author.clone(),
            categories: self.categories.clone(),
        }
    }
}

/// Parse a publish timestamp as RFC3339, or as a bare `YYYY-MM-DD` date at
/// midnight UTC (the common shape in Markdown front-matter).
pub(crate) fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Retrieves content items, abstracting over the CMS and the Markdown tree.
///
/// Reads never fail: an unconfigured CMS short-circuits to empty results
/// without network I/O, and query or I/O errors are logged and degraded to
/// empty/`None` so pages always have something to render.
pub struct ContentStore {
    cms: Option<CmsClient>,
    markdown: MarkdownSource,
    default_page_size: usize,
}

impl ContentStore {
    pub fn new(config: &Config) -> Self {
        Self {
            cms: CmsClient::from_config(config),
            markdown: MarkdownSource::new(&config.content_dir),
            default_page_size: config.default_page_size,
        }
    }

    /// List items of a content type for a locale, newest first, capped at
    /// `limit` (default page size when unset). Never fails.
    pub async fn list(
        &self,
        kind: ContentType,
        locale: Locale,
        limit: Option<usize>,
    ) -> Vec<ContentItem> {
        let limit = limit.unwrap_or(self.default_page_size);

        match kind.source() {
            ContentSource::Cms(doc_type) => match &self.cms {
                Some(cms) => cms.list_documents(doc_type, limit).await.unwrap_or_else(|e| {
                    warn!("CMS listing for '{}' failed: {:#}", doc_type, e);
                    Vec::new()
                }),
                None => {
                    debug!("CMS not configured; returning empty '{}' listing", doc_type);
                    Vec::new()
                }
            },
            ContentSource::Markdown(dir) => {
                self.markdown.list(dir, locale, limit).await.unwrap_or_else(|e| {
                    warn!("Markdown listing for '{}' failed: {:#}", dir, e);
                    Vec::new()
                })
            }
        }
    }

    /// Fetch a single item by slug. `None` means not found (or the backing
    /// source is unconfigured/unavailable); callers map it to 404.
    pub async fn get(&self, kind: ContentType, slug: &str, locale: Locale) -> Option<ContentItem> {
        match kind.source() {
            ContentSource::Cms(doc_type) => match &self.cms {
                Some(cms) => cms.get_document(doc_type, slug).await.unwrap_or_else(|e| {
                    warn!("CMS fetch for '{}/{}' failed: {:#}", doc_type, slug, e);
                    None
                }),
                None => {
                    debug!("CMS not configured; '{}/{}' resolves to not-found", doc_type, slug);
                    None
                }
            },
            ContentSource::Markdown(dir) => {
                self.markdown.get(dir, locale, slug).await.unwrap_or_else(|e| {
                    warn!("Markdown fetch for '{}/{}' failed: {:#}", dir, slug, e);
                    None
                })
            }
        }
    }
}
