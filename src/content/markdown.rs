//! Static Markdown content source.
//!
//! Content files live under `<root>/<type-dir>/<locale>/*.md` with YAML
//! front-matter followed by the body:
//!
//! ```markdown
//! ---
//! title: Our first use case
//! slug: first-use-case
//! publishedAt: 2024-05-01
//! author: Team
//! categories: [manufacturing]
//! excerpt: How a customer uses the platform
//! ---
//!
//! Body text...
//! ```
//!
//! Files that cannot be parsed are skipped with a warning rather than
//! failing the listing. A locale directory with no usable files falls back
//! to the `en` directory so localized pages always have something to show.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use super::{parse_published_at, ContentItem};
use crate::locale::{Locale, LocalizedText};

pub struct MarkdownSource {
    root: PathBuf,
}

/// Metadata extracted from a file's YAML front-matter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    excerpt: Option<String>,
}

impl MarkdownSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List the items of one content-type directory for a locale, newest
    /// first, capped at `limit`.
    pub async fn list(&self, dir: &str, locale: Locale, limit: usize) -> Result<Vec<ContentItem>> {
        let mut items = self.read_locale_dir(dir, locale).await?;

        if items.is_empty() && locale != Locale::En {
            items = self.read_locale_dir(dir, Locale::En).await?;
        }

        items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        items.truncate(limit);

        Ok(items)
    }

    /// Find a single item by slug, preferring the locale's own directory.
    pub async fn get(&self, dir: &str, locale: Locale, slug: &str) -> Result<Option<ContentItem>> {
        let items = self.read_locale_dir(dir, locale).await?;
        if let Some(item) = items.into_iter().find(|item| item.slug == slug) {
            return Ok(Some(item));
        }

        if locale != Locale::En {
            let fallback = self.read_locale_dir(dir, Locale::En).await?;
            return Ok(fallback.into_iter().find(|item| item.slug == slug));
        }

        Ok(None)
    }

    /// Read and parse every `.md` file in `<root>/<dir>/<locale>/`. A
    /// missing directory is an empty listing, not an error.
    async fn read_locale_dir(&self, dir: &str, locale: Locale) -> Result<Vec<ContentItem>> {
        let locale_dir = self.root.join(dir).join(locale.code());

        let mut read_dir = match fs::read_dir(&locale_dir).await {
            Ok(read_dir) => read_dir,
            Err(_) => return Ok(Vec::new()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }

        let parsed = join_all(paths.iter().map(|path| parse_file(path, locale))).await;
        Ok(parsed.into_iter().flatten().collect())
    }
}

/// Parse one Markdown file into a content item for `locale`. Returns `None`
/// (after logging) for files without valid front-matter.
async fn parse_file(path: &Path, locale: Locale) -> Option<ContentItem> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    let (front_matter, body) = split_front_matter(&content)?;

    let meta: FrontMatter = match serde_yaml::from_str(front_matter) {
        Ok(meta) => meta,
        Err(e) => {
            warn!("Skipping {}: invalid front-matter ({})", path.display(), e);
            return None;
        }
    };

    let slug = meta.slug.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    // Committed files are published by definition: a missing or unparseable
    // timestamp sorts last instead of hiding the item.
    let published_at = meta
        .published_at
        .as_deref()
        .and_then(parse_published_at)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let mut item = ContentItem {
        slug,
        published_at,
        author: meta.author,
        categories: meta.categories,
        title: LocalizedText::single(locale, meta.title),
        excerpt: LocalizedText::default(),
        body: LocalizedText::single(locale, body),
    };
    if let Some(excerpt) = meta.excerpt {
        item.excerpt.set(locale, excerpt);
    }

    Some(item)
}

/// Split a document into (front-matter, body). `None` when the front-matter
/// delimiters are missing.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let end_idx = rest.find("\n---")?;

    let front_matter = rest[..end_idx].trim();
    let body = rest[end_idx + 4..].trim_start_matches('-').trim();

    Some((front_matter, body))
}
