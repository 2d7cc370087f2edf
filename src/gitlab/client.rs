//! GitLab REST client.
//!
//! # Responsibilities
//! - Build `/api/v4` URLs (project paths are encoded as a single segment)
//! - Authenticate with the `PRIVATE-TOKEN` header
//! - Surface non-2xx answers as `GitlabError::Status` so callers can relay them
//!
//! Redirects are not followed; a 3xx is reported like any other non-success status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::GitlabConfig;
use crate::gitlab::types::{
    CreateDiscussionOptions, Discussion, GitlabError, GitlabResult, MergeRequest, Note,
    ProjectInfo, UpdateMergeRequestOptions, UpdateNoteOptions,
};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Merge request operations the HTTP handlers depend on.
#[async_trait]
pub trait MergeRequestApi: Send + Sync {
    async fn update_merge_request(
        &self,
        project: &ProjectInfo,
        options: &UpdateMergeRequestOptions,
    ) -> GitlabResult<MergeRequest>;

    async fn create_discussion(
        &self,
        project: &ProjectInfo,
        options: &CreateDiscussionOptions,
    ) -> GitlabResult<Discussion>;

    async fn update_discussion_note(
        &self,
        project: &ProjectInfo,
        discussion_id: &str,
        note_id: u64,
        options: &UpdateNoteOptions,
    ) -> GitlabResult<Note>;

    async fn delete_discussion_note(
        &self,
        project: &ProjectInfo,
        discussion_id: &str,
        note_id: u64,
    ) -> GitlabResult<()>;
}

/// HTTP client for one GitLab instance.
#[derive(Clone)]
pub struct GitlabClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl GitlabClient {
    /// Create a client from configuration.
    pub fn new(config: &GitlabConfig) -> GitlabResult<Self> {
        let mut api_base = Url::parse(&config.base_url)
            .map_err(|e| GitlabError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        api_base
            .path_segments_mut()
            .map_err(|_| GitlabError::InvalidUrl(config.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "v4"]);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none())
            .user_agent(concat!("mr-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base,
            token: config.token.clone(),
        })
    }

    /// Root of the REST API, e.g. `https://gitlab.com/api/v4`.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Find the open merge request whose source branch is `source_branch`.
    pub async fn find_merge_request(
        &self,
        project_id: &str,
        source_branch: &str,
    ) -> GitlabResult<Option<MergeRequest>> {
        let url = self.endpoint(&["projects", project_id, "merge_requests"])?;
        let request = self
            .http
            .get(url)
            .query(&[("state", "opened"), ("source_branch", source_branch)]);

        let merge_requests: Vec<MergeRequest> = self.send_json(request).await?;
        Ok(merge_requests.into_iter().next())
    }

    fn endpoint(&self, segments: &[&str]) -> GitlabResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GitlabError::InvalidUrl(self.api_base.to_string()))?
            .extend(segments);
        Ok(url)
    }

    fn merge_request_endpoint(&self, project: &ProjectInfo, rest: &[&str]) -> GitlabResult<Url> {
        let iid = project.merge_request_iid.to_string();
        let mut segments = vec!["projects", project.project_id.as_str(), "merge_requests", iid.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn send(&self, request: RequestBuilder) -> GitlabResult<Response> {
        let response = request.header(TOKEN_HEADER, &self.token).send().await?;
        let status = response.status();
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "GitLab returned non-success status");
            return Err(GitlabError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GitlabResult<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl MergeRequestApi for GitlabClient {
    async fn update_merge_request(
        &self,
        project: &ProjectInfo,
        options: &UpdateMergeRequestOptions,
    ) -> GitlabResult<MergeRequest> {
        let url = self.merge_request_endpoint(project, &[])?;
        self.send_json(self.http.put(url).json(options)).await
    }

    async fn create_discussion(
        &self,
        project: &ProjectInfo,
        options: &CreateDiscussionOptions,
    ) -> GitlabResult<Discussion> {
        let url = self.merge_request_endpoint(project, &["discussions"])?;
        self.send_json(self.http.post(url).json(options)).await
    }

    async fn update_discussion_note(
        &self,
        project: &ProjectInfo,
        discussion_id: &str,
        note_id: u64,
        options: &UpdateNoteOptions,
    ) -> GitlabResult<Note> {
        let note_id = note_id.to_string();
        let url = self.merge_request_endpoint(project, &["discussions", discussion_id, "notes", note_id.as_str()])?;
        self.send_json(self.http.put(url).json(options)).await
    }

    async fn delete_discussion_note(
        &self,
        project: &ProjectInfo,
        discussion_id: &str,
        note_id: u64,
    ) -> GitlabResult<()> {
        let note_id = note_id.to_string();
        let url = self.merge_request_endpoint(project, &["discussions", discussion_id, "notes", note_id.as_str()])?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
