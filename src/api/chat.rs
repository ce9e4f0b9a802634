//! AI chat endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{require_field, ApiError, AppState};
use crate::ai;
use crate::locale::Locale;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    message: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    reply: String,
}

/// POST /api/ai-chat - always answers with some reply text; provider
/// failures are absorbed by the canned-reply fallback.
pub async fn ai_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let message = require_field(body.message, "message")?;
    let locale = body
        .locale
        .as_deref()
        .map(Locale::from_code_or_default)
        .unwrap_or_default();

    let reply = ai::generate_reply(&state.config, &message, locale).await;

    Ok(Json(ChatResponseBody { reply }))
}
