//! Request handling and decoding.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Read the request body under the configured size limit
//! - Decode the body into the handler's request type
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body reading and JSON decoding fail separately so callers can tell them apart

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName},
};
use serde::de::DeserializeOwned;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::response::ApiError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const READ_BODY_MESSAGE: &str = "Could not read request body";

/// Layer that stamps `x-request-id` on requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Request ID for log lines, `"unknown"` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Read at most `limit` bytes of `body` and decode them as `T`.
///
/// `json_message` is the caller-facing message used when decoding fails.
pub async fn read_json<T: DeserializeOwned>(
    body: Body,
    limit: usize,
    json_message: &'static str,
) -> Result<T, ApiError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|source| ApiError::ReadBody {
            message: READ_BODY_MESSAGE,
            source,
        })?;

    serde_json::from_slice(&bytes).map_err(|source| ApiError::InvalidJson {
        message: json_message,
        source,
    })
}
