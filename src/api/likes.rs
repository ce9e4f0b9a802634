//! Like endpoints.
//!
//! Like uniqueness is enforced by the datastore constraint: a duplicate
//! insert surfaces here as the "already liked" rejection, so two racing
//! requests produce exactly one stored row and one conflict.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::{require_field, valid_email, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LikesParams {
    #[serde(rename = "postId")]
    post_id: Option<String>,
    #[serde(rename = "userEmail")]
    user_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    likes: usize,
    user_has_liked: bool,
}

/// GET /api/likes?postId=&userEmail= - like count, plus whether the
/// requester has already liked the item when an email is supplied.
pub async fn get_likes(
    State(state): State<AppState>,
    Query(params): Query<LikesParams>,
) -> Result<Json<LikesResponse>, ApiError> {
    let post_id = require_field(params.post_id, "postId")?;

    let Some(db) = &state.db else {
        return Ok(Json(LikesResponse {
            likes: 0,
            user_has_liked: false,
        }));
    };

    let likes = db.like_count(&post_id).unwrap_or_else(|e| {
        warn!("Failed to count likes for {}: {:#}", post_id, e);
        0
    });

    let user_has_liked = match params.user_email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => db.has_liked(&post_id, email).unwrap_or_else(|e| {
            warn!("Failed to check like for {}: {:#}", post_id, e);
            false
        }),
        None => false,
    };

    Ok(Json(LikesResponse {
        likes,
        user_has_liked,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    post_id: Option<String>,
    user_name: Option<String>,
    user_email: Option<String>,
    action: Option<String>,
}

/// POST /api/likes - like (201) or unlike (200, idempotent).
pub async fn toggle_like(
    State(state): State<AppState>,
    Json(request): Json<ToggleLikeRequest>,
) -> Result<Response, ApiError> {
    let post_id = require_field(request.post_id, "postId")?;
    let user_name = require_field(request.user_name, "userName")?;
    let user_email = require_field(request.user_email, "userEmail")?;
    let action = require_field(request.action, "action")?;

    if !valid_email(&user_email) {
        return Err(ApiError::Validation("userEmail is not a valid email".to_string()));
    }

    let Some(db) = &state.db else {
        return Err(ApiError::Unavailable("Like storage is not available".to_string()));
    };

    match action.as_str() {
        "like" => {
            let like = db
                .add_like(&post_id, &user_name, &user_email)
                .map_err(|e| {
                    error!("Failed to store like for {}: {:#}", post_id, e);
                    ApiError::Internal("Failed to store like".to_string())
                })?;

            match like {
                Some(like) => Ok((
                    StatusCode::CREATED,
                    Json(serde_json::json!({ "like": like })),
                )
                    .into_response()),
                None => Err(ApiError::Conflict("Already liked".to_string())),
            }
        }
        "unlike" => {
            let removed = db.remove_like(&post_id, &user_email).map_err(|e| {
                error!("Failed to remove like for {}: {:#}", post_id, e);
                ApiError::Internal("Failed to remove like".to_string())
            })?;

            Ok((
                StatusCode::OK,
                Json(serde_json::json!({ "removed": removed })),
            )
                .into_response())
        }
        other => Err(ApiError::Validation(format!(
            "action must be \"like\" or \"unlike\", got \"{}\"",
            other
        ))),
    }
}
