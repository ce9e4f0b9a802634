//! Locale resolution and localized field handling.
//!
//! The site serves three languages, selected by the first URL path segment
//! (`/en/...`, `/vi/...`, `/ja/...`). Anything else resolves to the default
//! locale. Localized content fields carry one optional value per locale and
//! resolve with a fixed fallback order: requested locale, then English, then
//! the empty string.

use serde::{Deserialize, Serialize};

/// A supported site locale.
///
/// The set is closed: content schemas, URL routing, and the canned chat
/// replies all key off these three codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// English (default / fallback)
    #[default]
    En,
    /// Vietnamese
    Vi,
    /// Japanese
    Ja,
}

/// All supported locales, in display order.
pub const SUPPORTED_LOCALES: [Locale; 3] = [Locale::En, Locale::Vi, Locale::Ja];

impl Locale {
    /// Parse a locale from its ISO 639-1 code. Returns `None` for anything
    /// outside the supported set.
    pub fn from_code(code: &str) -> Option<Locale> {
        match code {
            "en" => Some(Locale::En),
            "vi" => Some(Locale::Vi),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }

    /// Parse a locale code, substituting the default for unknown or missing
    /// input. This is the lenient form used on request boundaries.
    pub fn from_code_or_default(code: &str) -> Locale {
        Locale::from_code(code).unwrap_or_default()
    }

    /// The ISO 639-1 code for this locale.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Vi => "vi",
            Locale::Ja => "ja",
        }
    }

    /// The language name in its native form.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Vi => "Tiếng Việt",
            Locale::Ja => "日本語",
        }
    }
}

/// Resolve the active locale from a request path.
///
/// Takes the first non-empty path segment; if it names a supported locale,
/// that locale is active, otherwise the default applies. Pure function of the
/// path string, never errors.
pub fn resolve_locale(path: &str) -> Locale {
    let first_segment = path
        .trim_start_matches('/')
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("");
    Locale::from_code_or_default(first_segment)
}

/// A per-locale value bundle for a single logical field (title, excerpt,
/// body). Not every locale is required to have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ja: Option<String>,
}

impl LocalizedText {
    /// A bundle with a single entry under `locale`.
    pub fn single(locale: Locale, value: impl Into<String>) -> Self {
        let mut text = LocalizedText::default();
        text.set(locale, value);
        text
    }

    /// Set the entry for one locale.
    pub fn set(&mut self, locale: Locale, value: impl Into<String>) {
        let slot = match locale {
            Locale::En => &mut self.en,
            Locale::Vi => &mut self.vi,
            Locale::Ja => &mut self.ja,
        };
        *slot = Some(value.into());
    }

    /// The raw entry for one locale, without fallback.
    pub fn get(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::En => self.en.as_deref(),
            Locale::Vi => self.vi.as_deref(),
            Locale::Ja => self.ja.as_deref(),
        }
    }

    /// Resolve the best value for `locale`.
    ///
    /// Fallback order is fixed: requested locale, then English, then the
    /// empty string. Applied per field, so one field may fall back while a
    /// sibling field does not.
    pub fn resolve(&self, locale: Locale) -> &str {
        self.get(locale)
            .or_else(|| self.get(Locale::En))
            .unwrap_or("")
    }

    /// True when no locale has an entry.
    pub fn is_empty(&self) -> bool {
        self.en.is_none() && self.vi.is_none() && self.ja.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Locale Tests ====================

    #[test]
    fn test_from_code_supported() {
        assert_eq!(Locale::from_code("en"), Some(Locale::En));
        assert_eq!(Locale::from_code("vi"), Some(Locale::Vi));
        assert_eq!(Locale::from_code("ja"), Some(Locale::Ja));
    }

    #[test]
    fn test_from_code_unsupported() {
        assert_eq!(Locale::from_code("fr"), None);
        assert_eq!(Locale::from_code("EN"), None);
        assert_eq!(Locale::from_code(""), None);
        assert_eq!(Locale::from_code("en-US"), None);
    }

    #[test]
    fn test_from_code_or_default() {
        assert_eq!(Locale::from_code_or_default("ja"), Locale::Ja);
        assert_eq!(Locale::from_code_or_default("de"), Locale::En);
        assert_eq!(Locale::from_code_or_default(""), Locale::En);
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Locale::default(), Locale::En);
    }

    #[test]
    fn test_code_round_trip() {
        for locale in SUPPORTED_LOCALES {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
    }

    #[test]
    fn test_native_names() {
        assert_eq!(Locale::En.native_name(), "English");
        assert_eq!(Locale::Vi.native_name(), "Tiếng Việt");
        assert_eq!(Locale::Ja.native_name(), "日本語");
    }

    // ==================== resolve_locale Tests ====================

    #[test]
    fn test_resolve_locale_supported_segments() {
        assert_eq!(resolve_locale("/en/blog"), Locale::En);
        assert_eq!(resolve_locale("/vi/blog/some-post"), Locale::Vi);
        assert_eq!(resolve_locale("/ja/use-cases"), Locale::Ja);
    }

    #[test]
    fn test_resolve_locale_bare_segment() {
        assert_eq!(resolve_locale("/vi"), Locale::Vi);
        assert_eq!(resolve_locale("/ja/"), Locale::Ja);
    }

    #[test]
    fn test_resolve_locale_unsupported_falls_back() {
        assert_eq!(resolve_locale("/fr/blog"), Locale::En);
        assert_eq!(resolve_locale("/blog"), Locale::En);
        assert_eq!(resolve_locale("/api/comments"), Locale::En);
    }

    #[test]
    fn test_resolve_locale_empty_and_root() {
        assert_eq!(resolve_locale(""), Locale::En);
        assert_eq!(resolve_locale("/"), Locale::En);
    }

    #[test]
    fn test_resolve_locale_no_leading_slash() {
        assert_eq!(resolve_locale("vi/blog"), Locale::Vi);
    }

    #[test]
    fn test_resolve_locale_query_string_on_first_segment() {
        assert_eq!(resolve_locale("/ja?tab=news"), Locale::Ja);
        assert_eq!(resolve_locale("/vi#section"), Locale::Vi);
    }

    proptest! {
        // Any path whatsoever resolves to a member of the supported set.
        #[test]
        fn prop_resolve_locale_total(path in ".*") {
            let locale = resolve_locale(&path);
            prop_assert!(SUPPORTED_LOCALES.contains(&locale));
        }

        // A supported prefix always wins, regardless of the rest of the path.
        #[test]
        fn prop_resolve_locale_supported_prefix(rest in "[a-z0-9/._-]*") {
            prop_assert_eq!(resolve_locale(&format!("/vi/{}", rest)), Locale::Vi);
        }
    }

    // ==================== LocalizedText Tests ====================

    #[test]
    fn test_resolve_prefers_requested_locale() {
        let mut text = LocalizedText::default();
        text.set(Locale::En, "Hello");
        text.set(Locale::Vi, "Xin chào");

        assert_eq!(text.resolve(Locale::Vi), "Xin chào");
        assert_eq!(text.resolve(Locale::En), "Hello");
    }

    #[test]
    fn test_resolve_falls_back_to_english() {
        let text = LocalizedText::single(Locale::En, "Hello");

        assert_eq!(text.resolve(Locale::Ja), "Hello");
        assert_eq!(text.resolve(Locale::Vi), "Hello");
    }

    #[test]
    fn test_resolve_empty_when_no_entries() {
        let text = LocalizedText::default();

        assert_eq!(text.resolve(Locale::En), "");
        assert_eq!(text.resolve(Locale::Vi), "");
        assert_eq!(text.resolve(Locale::Ja), "");
    }

    #[test]
    fn test_resolve_no_english_no_fallback_chain_to_other_locales() {
        // Only a Japanese entry exists: Vietnamese falls through ja-less
        // English to empty, it does not borrow the Japanese value.
        let text = LocalizedText::single(Locale::Ja, "こんにちは");

        assert_eq!(text.resolve(Locale::Ja), "こんにちは");
        assert_eq!(text.resolve(Locale::Vi), "");
        assert_eq!(text.resolve(Locale::En), "");
    }

    #[test]
    fn test_fallback_is_per_field() {
        // A title may fall back while the excerpt does not.
        let title = LocalizedText::single(Locale::En, "Our Services");
        let mut excerpt = LocalizedText::single(Locale::En, "What we do");
        excerpt.set(Locale::Vi, "Chúng tôi làm gì");

        assert_eq!(title.resolve(Locale::Vi), "Our Services");
        assert_eq!(excerpt.resolve(Locale::Vi), "Chúng tôi làm gì");
    }

    #[test]
    fn test_single_and_is_empty() {
        let text = LocalizedText::single(Locale::Vi, "Xin chào");
        assert_eq!(text.get(Locale::Vi), Some("Xin chào"));
        assert_eq!(text.get(Locale::En), None);
        assert!(!text.is_empty());
        assert!(LocalizedText::default().is_empty());
    }

    #[test]
    fn test_deserialize_partial_bundle() {
        let text: LocalizedText =
            serde_json::from_str(r#"{"en": "Hello", "ja": "こんにちは"}"#).expect("deserialize");

        assert_eq!(text.get(Locale::En), Some("Hello"));
        assert_eq!(text.get(Locale::Ja), Some("こんにちは"));
        assert_eq!(text.get(Locale::Vi), None);
    }

    #[test]
    fn test_serialize_skips_missing_locales() {
        let text = LocalizedText::single(Locale::En, "Hello");
        let json = serde_json::to_string(&text).expect("serialize");

        assert_eq!(json, r#"{"en":"Hello"}"#);
    }
}
