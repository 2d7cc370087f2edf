//! mr-bridge
//!
//! Serves simplified assignee and comment endpoints for one GitLab merge request.
//!
//! ```text
//!     client ──PUT /mr/assignee──┐
//!     client ──POST/PATCH/DELETE─┤   ┌───────────┐    ┌──────────────┐
//!              /comment          └──▶│  handler  │───▶│ GitLab REST  │
//!                                    │  (axum)   │◀───│   API v4     │
//!     client ◀──JSON envelope────────└───────────┘    └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mr_bridge::config::load_config;
use mr_bridge::lifecycle::{build_server, Shutdown};
use mr_bridge::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "mr-bridge")]
#[command(about = "JSON bridge for GitLab merge request assignees and comments", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "mr-bridge.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        gitlab = %config.gitlab.base_url,
        "mr-bridge starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = build_server(config).await?;

    // Dropping the sender would close the channel and stop the server.
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
