//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Stop on an OS signal or an external shutdown broadcast

use axum::{routing::any, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BridgeConfig;
use crate::gitlab::{MergeRequestApi, ProjectInfo};
use crate::http::assignee::assignee_handler;
use crate::http::comment::comment_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::wait_for_signal;

pub const ASSIGNEE_PATH: &str = "/mr/assignee";
pub const COMMENT_PATH: &str = "/comment";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn MergeRequestApi>,
    pub project: Arc<ProjectInfo>,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(api: Arc<dyn MergeRequestApi>, project: ProjectInfo, max_body_size: usize) -> Self {
        Self {
            api,
            project: Arc::new(project),
            max_body_size,
        }
    }
}

/// HTTP server for the bridge.
pub struct HttpServer {
    router: Router,
    config: BridgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `project` through `api`.
    pub fn new(config: BridgeConfig, api: Arc<dyn MergeRequestApi>, project: ProjectInfo) -> Self {
        let state = AppState::new(api, project, config.security.max_body_size);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = wait_for_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
///
/// `/mr/assignee` and `/comment` accept every method and dispatch themselves
/// so that 405 responses carry the JSON envelope and the right allow header.
#[allow(deprecated)]
pub fn build_router(config: &BridgeConfig, state: AppState) -> Router {
    Router::new()
        .route(ASSIGNEE_PATH, any(assignee_handler))
        .route(COMMENT_PATH, any(comment_handler))
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

#[derive(Serialize)]
struct HealthStatus {
    version: &'static str,
    status: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}
