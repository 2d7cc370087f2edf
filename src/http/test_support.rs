//! In-process fakes for handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::BridgeConfig;
use crate::gitlab::types::{
    CreateDiscussionOptions, Discussion, GitlabError, GitlabResult, MergeRequest, Note,
    ProjectInfo, UpdateMergeRequestOptions, UpdateNoteOptions,
};
use crate::gitlab::MergeRequestApi;
use crate::http::server::{build_router, AppState};

/// How the fake should fail, if at all.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UpdateMergeRequest(UpdateMergeRequestOptions),
    CreateDiscussion(CreateDiscussionOptions),
    UpdateNote(String, u64, UpdateNoteOptions),
    DeleteNote(String, u64),
}

#[derive(Default)]
pub struct FakeApi {
    pub merge_request: MergeRequest,
    pub discussion: Discussion,
    pub note: Note,
    pub failure: Option<Failure>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn failing(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record<T: Clone>(&self, call: Call, value: &T) -> GitlabResult<T> {
        self.calls.lock().unwrap().push(call);
        match self.failure {
            Some(Failure::Status(status)) => Err(GitlabError::Status {
                status,
                body: String::new(),
            }),
            Some(Failure::Transport) => Err(GitlabError::InvalidUrl("unreachable".into())),
            None => Ok(value.clone()),
        }
    }
}

#[async_trait]
impl MergeRequestApi for FakeApi {
    async fn update_merge_request(
        &self,
        _project: &ProjectInfo,
        options: &UpdateMergeRequestOptions,
    ) -> GitlabResult<MergeRequest> {
        self.record(Call::UpdateMergeRequest(options.clone()), &self.merge_request)
    }

    async fn create_discussion(
        &self,
        _project: &ProjectInfo,
        options: &CreateDiscussionOptions,
    ) -> GitlabResult<Discussion> {
        self.record(Call::CreateDiscussion(options.clone()), &self.discussion)
    }

    async fn update_discussion_note(
        &self,
        _project: &ProjectInfo,
        discussion_id: &str,
        note_id: u64,
        options: &UpdateNoteOptions,
    ) -> GitlabResult<Note> {
        self.record(
            Call::UpdateNote(discussion_id.to_string(), note_id, options.clone()),
            &self.note,
        )
    }

    async fn delete_discussion_note(
        &self,
        _project: &ProjectInfo,
        discussion_id: &str,
        note_id: u64,
    ) -> GitlabResult<()> {
        self.record(Call::DeleteNote(discussion_id.to_string(), note_id), &())
    }
}

/// Router over `api`, plus a handle for inspecting recorded calls.
pub fn router_with(api: FakeApi) -> (Router, Arc<FakeApi>) {
    let api = Arc::new(api);
    let project = ProjectInfo {
        project_id: "group/app".into(),
        merge_request_iid: 7,
    };
    let config = BridgeConfig::default();
    let state = AppState::new(api.clone(), project, config.security.max_body_size);
    (build_router(&config, state), api)
}

/// Send one request and decode the JSON body (`Null` when empty).
pub async fn send(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}
