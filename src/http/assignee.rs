//! `PUT /mr/assignee`: replace the merge request's assignees.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gitlab::types::UpdateMergeRequestOptions;
use crate::http::request::{read_json, request_id};
use crate::http::response::{ApiError, AssigneeUpdateResponse, SuccessResponse};
use crate::http::server::{AppState, ASSIGNEE_PATH};
use crate::observability::metrics;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssigneeUpdateRequest {
    pub ids: Vec<u64>,
}

pub async fn assignee_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let response = update_assignees(&state, request).await.into_response();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        status = response.status().as_u16(),
        "Handled assignee request"
    );
    metrics::record_request(ASSIGNEE_PATH, method.as_str(), response.status().as_u16(), start);
    response
}

async fn update_assignees(
    state: &AppState,
    request: Request<Body>,
) -> Result<Json<AssigneeUpdateResponse>, ApiError> {
    if request.method() != Method::PUT {
        return Err(ApiError::MethodNotAllowed {
            message: "Expected PUT",
            header: header::ALLOW,
            allowed: "PUT",
        });
    }

    let payload: AssigneeUpdateRequest = read_json(
        request.into_body(),
        state.max_body_size,
        "Could not read JSON from request",
    )
    .await?;

    let options = UpdateMergeRequestOptions {
        assignee_ids: Some(payload.ids),
    };

    let merge_request = state
        .api
        .update_merge_request(&state.project, &options)
        .await
        .map_err(|source| {
            metrics::record_upstream_error("update_merge_request");
            let message = if source.status().is_some() {
                "Gitlab returned non-200 status"
            } else {
                "Could not modify merge request assignees"
            };
            ApiError::upstream(message, StatusCode::INTERNAL_SERVER_ERROR, source)
        })?;

    Ok(Json(AssigneeUpdateResponse {
        success: SuccessResponse::ok("Assignees updated"),
        assignees: merge_request.assignees,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::types::{BasicUser, MergeRequest};
    use crate::http::test_support::{router_with, send, Call, FakeApi, Failure};

    #[tokio::test]
    async fn test_updates_assignees() {
        let api = FakeApi {
            merge_request: MergeRequest {
                iid: 7,
                assignees: vec![BasicUser {
                    id: 3,
                    username: "ann".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };
        let (router, api) = router_with(api);

        let (status, _, body) = send(router, Method::PUT, "/mr/assignee", r#"{"ids":[3]}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Assignees updated");
        assert_eq!(body["status"], 200);
        assert_eq!(body["assignees"][0]["username"], "ann");
        assert_eq!(
            api.calls(),
            vec![Call::UpdateMergeRequest(UpdateMergeRequestOptions {
                assignee_ids: Some(vec![3])
            })]
        );
    }

    #[tokio::test]
    async fn test_empty_ids_clear_assignees() {
        let (router, api) = router_with(FakeApi::default());
        let (status, _, body) = send(router, Method::PUT, "/mr/assignee", r#"{"ids":[]}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assignees"], serde_json::json!([]));
        assert_eq!(
            api.calls(),
            vec![Call::UpdateMergeRequest(UpdateMergeRequestOptions {
                assignee_ids: Some(vec![])
            })]
        );
    }

    #[tokio::test]
    async fn test_rejects_other_methods() {
        for method in [Method::GET, Method::POST, Method::PATCH, Method::DELETE] {
            let (router, api) = router_with(FakeApi::default());
            let (status, headers, body) = send(router, method, "/mr/assignee", r#"{"ids":[1]}"#).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(headers[header::ALLOW], "PUT");
            assert_eq!(body["message"], "Expected PUT");
            assert_eq!(body["status"], 405);
            assert!(api.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (router, api) = router_with(FakeApi::default());
        let (status, _, body) = send(router, Method::PUT, "/mr/assignee", r#"{"ids": "three"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Could not read JSON from request");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_status_relayed() {
        let (router, _) = router_with(FakeApi::failing(Failure::Status(422)));
        let (status, _, body) = send(router, Method::PUT, "/mr/assignee", r#"{"ids":[1]}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Gitlab returned non-200 status");
        assert_eq!(body["status"], 422);
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal_error() {
        let (router, _) = router_with(FakeApi::failing(Failure::Transport));
        let (status, _, body) = send(router, Method::PUT, "/mr/assignee", r#"{"ids":[1]}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Could not modify merge request assignees");
    }
}
