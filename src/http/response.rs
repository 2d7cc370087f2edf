//! Response envelopes and error mapping.
//!
//! # Responsibilities
//! - Success envelope `{message, status, ...payload}`
//! - Error envelope `{message, details, status}`
//! - Map request-shape, method and upstream errors to HTTP status codes
//!
//! # Design Decisions
//! - Upstream non-success statuses are relayed unchanged
//! - Transport failures use a per-operation fallback status
//! - Every body is JSON, including 405s

use axum::{
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gitlab::types::{BasicUser, Discussion, GitlabError, Note};

/// Common part of every 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub message: String,
    pub status: u16,
}

impl SuccessResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            message: message.to_string(),
            status: StatusCode::OK.as_u16(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeUpdateResponse {
    #[serde(flatten)]
    pub success: SuccessResponse,
    pub assignees: Vec<BasicUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    #[serde(flatten)]
    pub success: SuccessResponse,
    pub note: Option<Note>,
    pub discussion: Option<Discussion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub details: String,
    pub status: u16,
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read (I/O error or over the size limit).
    #[error("{message}: {source}")]
    ReadBody {
        message: &'static str,
        source: axum::Error,
    },

    /// The body was read but is not the expected JSON.
    #[error("{message}: {source}")]
    InvalidJson {
        message: &'static str,
        source: serde_json::Error,
    },

    /// Wrong verb. `header` is `Allow` or `Access-Control-Allow-Methods`.
    #[error("{message}")]
    MethodNotAllowed {
        message: &'static str,
        header: HeaderName,
        allowed: &'static str,
    },

    /// The GitLab call failed.
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        fallback: StatusCode,
        source: GitlabError,
    },
}

impl ApiError {
    pub fn upstream(message: &'static str, fallback: StatusCode, source: GitlabError) -> Self {
        ApiError::Upstream {
            message,
            fallback,
            source,
        }
    }

    /// HTTP status sent to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ReadBody { .. } | ApiError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream {
                fallback, source, ..
            } => source
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(*fallback),
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::ReadBody { message, .. }
            | ApiError::InvalidJson { message, .. }
            | ApiError::MethodNotAllowed { message, .. }
            | ApiError::Upstream { message, .. } => *message,
        }
    }

    fn details(&self) -> String {
        match self {
            ApiError::ReadBody { source, .. } => source.to_string(),
            ApiError::InvalidJson { source, .. } => source.to_string(),
            ApiError::MethodNotAllowed { .. } => "invalid request method".to_string(),
            ApiError::Upstream { source, .. } => source.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.message().to_string(),
            details: self.details(),
            status: self.status().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Upstream { source, .. } => {
                tracing::error!(status = status.as_u16(), error = %source, "{}", self.message());
            }
            _ => {
                tracing::warn!(status = status.as_u16(), details = %self.details(), "{}", self.message());
            }
        }

        let mut response = (status, Json(self.to_body())).into_response();
        if let ApiError::MethodNotAllowed { header, allowed, .. } = self {
            response
                .headers_mut()
                .insert(header, HeaderValue::from_static(allowed));
        }
        response
    }
}
