//! Comment endpoints.
//!
//! Reads degrade to an empty list so pages stay renderable when the
//! datastore is missing or failing; writes surface 503/500 instead, since a
//! dropped comment cannot be silently ignored.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::{require_field, valid_email, ApiError, AppState};
use crate::db::Comment;

#[derive(Debug, Deserialize)]
pub struct ListCommentsParams {
    #[serde(rename = "postId")]
    post_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    comments: Vec<Comment>,
}

/// GET /api/comments?postId= - approved comments, newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<ListCommentsParams>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let post_id = require_field(params.post_id, "postId")?;

    let Some(db) = &state.db else {
        return Ok(Json(CommentsResponse {
            comments: Vec::new(),
        }));
    };

    let comments = db.list_approved_comments(&post_id).unwrap_or_else(|e| {
        warn!("Failed to list comments for {}: {:#}", post_id, e);
        Vec::new()
    });

    Ok(Json(CommentsResponse { comments }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    post_id: Option<String>,
    content: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

/// POST /api/comments - store a comment, approved by default.
pub async fn create_comment(
    State(state): State<AppState>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let post_id = require_field(request.post_id, "postId")?;
    let content = require_field(request.content, "content")?;
    let author_name = require_field(request.author_name, "authorName")?;
    let author_email = require_field(request.author_email, "authorEmail")?;

    if !valid_email(&author_email) {
        return Err(ApiError::Validation("authorEmail is not a valid email".to_string()));
    }

    let Some(db) = &state.db else {
        return Err(ApiError::Unavailable(
            "Comment storage is not available".to_string(),
        ));
    };

    let comment = db
        .add_comment(&post_id, &content, &author_name, &author_email)
        .map_err(|e| {
            error!("Failed to store comment for {}: {:#}", post_id, e);
            ApiError::Internal("Failed to store comment".to_string())
        })?;

    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}
