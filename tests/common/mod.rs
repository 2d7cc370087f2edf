//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mr_bridge::config::BridgeConfig;
use mr_bridge::gitlab::{GitlabClient, ProjectInfo};
use mr_bridge::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const PROJECT_ID: &str = "42";
pub const MR_IID: u64 = 7;

/// A bridge running on an ephemeral port, talking to `gitlab_url`.
pub struct RunningBridge {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl RunningBridge {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningBridge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a bridge in the background and wait until it accepts connections.
pub async fn start_bridge(gitlab_url: &str) -> RunningBridge {
    start_bridge_with_timeouts(gitlab_url, 5, 10).await
}

/// Like [`start_bridge`], with explicit upstream and inbound timeouts.
pub async fn start_bridge_with_timeouts(
    gitlab_url: &str,
    gitlab_secs: u64,
    request_secs: u64,
) -> RunningBridge {
    let mut config = BridgeConfig::default();
    config.gitlab.base_url = gitlab_url.to_string();
    config.gitlab.token = "test-token".into();
    config.gitlab.project_id = PROJECT_ID.into();
    config.gitlab.merge_request_iid = Some(MR_IID);
    config.gitlab.timeout_secs = gitlab_secs;
    config.timeouts.request_secs = request_secs;
    mr_bridge::config::validation::validate_config(&config).unwrap();

    let api = GitlabClient::new(&config.gitlab).unwrap();
    let project = ProjectInfo {
        project_id: PROJECT_ID.into(),
        merge_request_iid: MR_IID,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(api), project);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    for _ in 0..50 {
        if client.get(format!("http://{}/health", addr)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    RunningBridge {
        addr,
        client,
        shutdown,
    }
}

/// Path of the served merge request under `/api/v4`.
pub fn mr_path(rest: &str) -> String {
    format!("/api/v4/projects/{}/merge_requests/{}{}", PROJECT_ID, MR_IID, rest)
}
