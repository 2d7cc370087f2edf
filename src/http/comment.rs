//! `/comment`: create, edit and delete merge request comments.
//!
//! POST creates a discussion. With a `file_name` it is attached to a diff
//! position (and, given a `line_range`, to a span of lines); without one it is
//! a plain note. PATCH rewrites a note's body, DELETE removes a note.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gitlab::line_code;
use crate::gitlab::types::{
    CreateDiscussionOptions, LinePositionOptions, LineRangeOptions, PositionOptions,
    UpdateNoteOptions,
};
use crate::http::request::{read_json, request_id};
use crate::http::response::{ApiError, CommentResponse, SuccessResponse};
use crate::http::server::{AppState, COMMENT_PATH};
use crate::observability::metrics;

const UNMARSHAL_MESSAGE: &str = "Could not unmarshal data from request body";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostCommentRequest {
    pub comment: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<u32>,
    pub head_commit_sha: String,
    pub base_commit_sha: String,
    pub start_commit_sha: String,
    #[serde(rename = "type")]
    pub position_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
}

/// First and last line of a multi-line comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: LinePosition,
    pub end: LinePosition,
}

/// One end of a line range. The line code is derived, not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePosition {
    #[serde(rename = "type")]
    pub line_type: String,
    pub old_line: u32,
    pub new_line: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteCommentRequest {
    pub note_id: u64,
    pub discussion_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditCommentRequest {
    pub comment: String,
    pub note_id: u64,
    pub discussion_id: String,
    pub resolved: bool,
}

pub async fn comment_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let response = match method {
        Method::DELETE => delete_comment(&state, request).await.into_response(),
        Method::POST => post_comment(&state, request).await.into_response(),
        Method::PATCH => edit_comment(&state, request).await.into_response(),
        _ => ApiError::MethodNotAllowed {
            message: "Expected DELETE, POST or PATCH",
            header: header::ACCESS_CONTROL_ALLOW_METHODS,
            allowed: "DELETE, POST, PATCH",
        }
        .into_response(),
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        status = response.status().as_u16(),
        "Handled comment request"
    );
    metrics::record_request(COMMENT_PATH, method.as_str(), response.status().as_u16(), start);
    response
}

async fn delete_comment(
    state: &AppState,
    request: Request<Body>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let payload: DeleteCommentRequest = read_json(
        request.into_body(),
        state.max_body_size,
        "Could not read JSON from request",
    )
    .await?;

    state
        .api
        .delete_discussion_note(&state.project, &payload.discussion_id, payload.note_id)
        .await
        .map_err(|source| {
            metrics::record_upstream_error("delete_discussion_note");
            ApiError::upstream("Could not delete comment", StatusCode::INTERNAL_SERVER_ERROR, source)
        })?;

    Ok(Json(SuccessResponse::ok("Comment deleted successfully")))
}

async fn post_comment(
    state: &AppState,
    request: Request<Body>,
) -> Result<Json<CommentResponse>, ApiError> {
    let payload: PostCommentRequest =
        read_json(request.into_body(), state.max_body_size, UNMARSHAL_MESSAGE).await?;

    let options = discussion_options(payload);

    let discussion = state
        .api
        .create_discussion(&state.project, &options)
        .await
        .map_err(|source| {
            metrics::record_upstream_error("create_discussion");
            ApiError::upstream("Could not create comment", StatusCode::BAD_REQUEST, source)
        })?;

    Ok(Json(CommentResponse {
        success: SuccessResponse::ok("Comment created successfully"),
        note: discussion.notes.first().cloned(),
        discussion: Some(discussion),
    }))
}

async fn edit_comment(
    state: &AppState,
    request: Request<Body>,
) -> Result<Json<CommentResponse>, ApiError> {
    let payload: EditCommentRequest =
        read_json(request.into_body(), state.max_body_size, UNMARSHAL_MESSAGE).await?;

    let options = UpdateNoteOptions {
        body: payload.comment,
    };

    let note = state
        .api
        .update_discussion_note(&state.project, &payload.discussion_id, payload.note_id, &options)
        .await
        .map_err(|source| {
            metrics::record_upstream_error("update_discussion_note");
            ApiError::upstream("Could not update comment", StatusCode::INTERNAL_SERVER_ERROR, source)
        })?;

    Ok(Json(CommentResponse {
        success: SuccessResponse::ok("Comment updated successfully"),
        note: Some(note),
        discussion: None,
    }))
}

/// Translate a comment request into GitLab's discussion options.
pub fn discussion_options(request: PostCommentRequest) -> CreateDiscussionOptions {
    if request.file_name.is_empty() {
        return CreateDiscussionOptions {
            body: request.comment,
            position: None,
        };
    }

    let line_range = request.line_range.map(|range| LineRangeOptions {
        start: LinePositionOptions {
            line_code: line_code(&request.file_name, range.start.old_line, range.start.new_line),
            line_type: range.start.line_type,
        },
        end: LinePositionOptions {
            line_code: line_code(&request.file_name, range.end.old_line, range.end.new_line),
            line_type: range.end.line_type,
        },
    });

    CreateDiscussionOptions {
        body: request.comment,
        position: Some(PositionOptions {
            base_sha: request.base_commit_sha,
            start_sha: request.start_commit_sha,
            head_sha: request.head_commit_sha,
            position_type: request.position_type,
            new_path: request.file_name.clone(),
            old_path: request.file_name,
            new_line: request.new_line,
            old_line: request.old_line,
            line_range,
        }),
    }
}
