//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the GitLab client from configuration
//! - Resolve which merge request this instance serves
//! - Assemble the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A configured iid is trusted; a source branch costs one lookup

use std::sync::Arc;

use thiserror::Error;

use crate::config::{BridgeConfig, GitlabConfig};
use crate::gitlab::{GitlabClient, GitlabError, ProjectInfo};
use crate::http::HttpServer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Gitlab(#[from] GitlabError),

    #[error("no open merge request for branch '{branch}' in project '{project}'")]
    NoMergeRequest { project: String, branch: String },
}

/// Work out the project/merge request pair from configuration.
pub async fn resolve_project(
    client: &GitlabClient,
    config: &GitlabConfig,
) -> Result<ProjectInfo, StartupError> {
    if let Some(iid) = config.merge_request_iid {
        return Ok(ProjectInfo {
            project_id: config.project_id.clone(),
            merge_request_iid: iid,
        });
    }

    let merge_request = client
        .find_merge_request(&config.project_id, &config.source_branch)
        .await?
        .ok_or_else(|| StartupError::NoMergeRequest {
            project: config.project_id.clone(),
            branch: config.source_branch.clone(),
        })?;

    tracing::info!(
        project = %config.project_id,
        branch = %config.source_branch,
        iid = merge_request.iid,
        title = %merge_request.title,
        "Resolved merge request from source branch"
    );

    Ok(ProjectInfo {
        project_id: config.project_id.clone(),
        merge_request_iid: merge_request.iid,
    })
}

/// Build a ready-to-run server for a validated configuration.
pub async fn build_server(config: BridgeConfig) -> Result<HttpServer, StartupError> {
    let client = GitlabClient::new(&config.gitlab)?;
    let project = resolve_project(&client, &config.gitlab).await?;

    tracing::info!(
        api = %client.api_base(),
        project = %project.project_id,
        iid = project.merge_request_iid,
        "Serving merge request"
    );

    Ok(HttpServer::new(config, Arc::new(client), project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn gitlab_config(base_url: &str) -> GitlabConfig {
        GitlabConfig {
            base_url: base_url.to_string(),
            token: "secret".into(),
            project_id: "42".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_configured_iid_skips_lookup() {
        let config = GitlabConfig {
            merge_request_iid: Some(9),
            ..gitlab_config("http://127.0.0.1:9")
        };
        let client = GitlabClient::new(&config).unwrap();

        let project = resolve_project(&client, &config).await.unwrap();
        assert_eq!(project.merge_request_iid, 9);
        assert_eq!(project.project_id, "42");
    }

    #[tokio::test]
    async fn test_branch_lookup() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v4/projects/42/merge_requests");
                then.status(200).json_body(json!([{ "iid": 31, "title": "Add login" }]));
            })
            .await;

        let config = GitlabConfig {
            source_branch: "login".into(),
            ..gitlab_config(&server.base_url())
        };
        let client = GitlabClient::new(&config).unwrap();

        let project = resolve_project(&client, &config).await.unwrap();
        assert_eq!(project.merge_request_iid, 31);
    }

    #[tokio::test]
    async fn test_branch_without_merge_request() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v4/projects/42/merge_requests");
                then.status(200).json_body(json!([]));
            })
            .await;

        let config = GitlabConfig {
            source_branch: "stale".into(),
            ..gitlab_config(&server.base_url())
        };
        let client = GitlabClient::new(&config).unwrap();

        let err = resolve_project(&client, &config).await.unwrap_err();
        assert!(matches!(err, StartupError::NoMergeRequest { .. }));
        assert!(err.to_string().contains("stale"));
    }
}
