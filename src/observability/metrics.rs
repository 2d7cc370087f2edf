//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): handled requests by endpoint, method, status
//! - `bridge_request_duration_seconds` (histogram): handler latency by endpoint, method
//! - `bridge_upstream_errors_total` (counter): failed GitLab calls by operation
//!
//! Recording is a no-op until a recorder is installed, so handlers and tests
//! can call these unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(endpoint: &'static str, method: &str, status: u16, start: Instant) {
    counter!(
        "bridge_requests_total",
        "endpoint" => endpoint,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "bridge_request_duration_seconds",
        "endpoint" => endpoint,
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a failed GitLab call.
pub fn record_upstream_error(operation: &'static str) {
    counter!("bridge_upstream_errors_total", "operation" => operation).increment(1);
}
