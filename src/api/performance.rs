//! Performance telemetry endpoints.
//!
//! Fire-and-forget: ingestion logs whatever it receives and always
//! acknowledges, and the read side reports backend configuration
//! diagnostics. Neither path is correctness-critical.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::locale::SUPPORTED_LOCALES;

#[derive(Debug, Deserialize)]
pub struct MetricPayload {
    name: Option<String>,
    value: Option<f64>,
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricAck {
    received: bool,
}

/// POST /api/performance - log a frontend metric and acknowledge.
pub async fn ingest_metric(Json(payload): Json<MetricPayload>) -> Json<MetricAck> {
    info!(
        metric = payload.name.as_deref().unwrap_or("unnamed"),
        value = payload.value.unwrap_or(0.0),
        timestamp = payload.timestamp.as_deref().unwrap_or(""),
        "performance metric"
    );

    Json(MetricAck { received: true })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    status: &'static str,
    cms_configured: bool,
    database_configured: bool,
    ai_configured: bool,
    locales: Vec<&'static str>,
}

/// GET /api/performance - backend configuration diagnostics.
pub async fn get_diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    Json(DiagnosticsResponse {
        status: "ok",
        cms_configured: state.config.cms_configured(),
        database_configured: state.config.database_configured(),
        ai_configured: state.config.ai_configured(),
        locales: SUPPORTED_LOCALES.iter().map(|l| l.code()).collect(),
    })
}
