//! Backend for the multilingual company website.
//!
//! Serves the content and community API: locale-aware content resolution
//! over a hosted CMS and a static Markdown tree, comments and likes in an
//! embedded datastore, an AI chat proxy with deterministic fallback, and
//! best-effort performance telemetry.
//!
//! The dominant policy is fail-soft: unconfigured or failing backends
//! degrade to empty/zero/canned results so pages always render; only writes
//! surface 5xx errors.

pub mod ai;
pub mod api;
pub mod config;
pub mod content;
pub mod db;
pub mod locale;
pub mod retry;
