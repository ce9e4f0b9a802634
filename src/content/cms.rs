//! Hosted CMS client.
//!
//! The CMS speaks a string-based query language over HTTP. All query
//! construction is isolated behind `list_documents`/`get_document` so the
//! CMS could be swapped without touching callers. Queries request only the
//! fields the content model needs, sorted by publish time descending.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::{parse_published_at, ContentItem};
use crate::config::Config;
use crate::locale::LocalizedText;
use crate::retry::{with_retry, RetryConfig};

const CMS_TIMEOUT: Duration = Duration::from_secs(10);

/// Fields projected out of every document query.
const PROJECTION: &str =
    r#"{title, "slug": slug.current, publishedAt, author, categories, excerpt, body}"#;

pub struct CmsClient {
    client: reqwest::Client,
    query_url: String,
}

/// CMS query response envelope.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

/// A raw CMS document. Localized fields arrive as per-locale objects;
/// anything the projection could not fill is simply absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CmsDocument {
    slug: Option<String>,
    published_at: Option<String>,
    author: Option<String>,
    categories: Option<Vec<String>>,
    title: LocalizedText,
    excerpt: LocalizedText,
    body: LocalizedText,
}

impl CmsDocument {
    /// Convert into the content model. Documents without a slug or a
    /// parseable publish timestamp are drafts and are dropped.
    fn into_item(self) -> Option<ContentItem> {
        let slug = self.slug?;
        let published_at = parse_published_at(self.published_at.as_deref()?)?;

        Some(ContentItem {
            slug,
            published_at,
            author: self.author,
            categories: self.categories.unwrap_or_default(),
            title: self.title,
            excerpt: self.excerpt,
            body: self.body,
        })
    }
}

impl CmsClient {
    /// Build a client from configuration. Returns `None` when the CMS is
    /// unconfigured so callers short-circuit without network I/O.
    pub fn from_config(config: &Config) -> Option<Self> {
        let query_url = config.cms_query_url()?;
        let client = match reqwest::Client::builder().timeout(CMS_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build CMS HTTP client: {}", e);
                return None;
            }
        };

        Some(Self { client, query_url })
    }

    /// Client pointed at an explicit query URL (tests).
    #[cfg(test)]
    pub fn with_query_url(query_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            query_url: query_url.into(),
        }
    }

    /// List documents of a type, newest first, limited to a page.
    pub async fn list_documents(&self, doc_type: &str, limit: usize) -> Result<Vec<ContentItem>> {
        let query = format!(
            r#"*[_type == "{}"] | order(publishedAt desc) [0...{}]{}"#,
            doc_type, limit, PROJECTION
        );

        let documents: Vec<CmsDocument> = self.run_query(&query).await?;
        Ok(documents
            .into_iter()
            .filter_map(CmsDocument::into_item)
            .collect())
    }

    /// Fetch a single document by slug. `Ok(None)` when the slug does not
    /// exist.
    pub async fn get_document(&self, doc_type: &str, slug: &str) -> Result<Option<ContentItem>> {
        let query = format!(
            r#"*[_type == "{}" && slug.current == "{}"][0]{}"#,
            doc_type,
            escape_query_string(slug),
            PROJECTION
        );

        let document: Option<CmsDocument> = self.run_query(&query).await?;
        Ok(document.and_then(CmsDocument::into_item))
    }

    /// Run a query with retries; the envelope's missing/null result maps to
    /// the type's default (empty list, absent document).
    async fn run_query<T>(&self, query: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        with_retry(&RetryConfig::cms_query(), "cms query", || {
            self.execute_query(query)
        })
        .await
    }

    async fn execute_query<T>(&self, query: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self
            .client
            .get(&self.query_url)
            .query(&[("query", query)])
            .send()
            .await
            .context("Failed to send CMS query")?;

        if !response.status().is_success() {
            bail!("CMS query error ({})", response.status());
        }

        let envelope: QueryResponse<T> = response
            .json()
            .await
            .context("Failed to parse CMS response")?;

        Ok(envelope.result.unwrap_or_default())
    }
}

/// Escape a value interpolated into a double-quoted query string literal.
fn escape_query_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
