//! Metrics collection and exposition.
//!
//! # Metrics
//! - `admin_http_requests_total` (counter): requests by method, status, provider
//! - `admin_http_request_duration_seconds` (histogram): latency distribution
//! - `admin_http_auth_challenges_total` (counter): 401 challenges sent
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels stay low-cardinality (no paths, no users)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed gateway request.
pub fn record_request(method: &str, status: u16, provider: &'static str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();

    counter!(
        "admin_http_requests_total",
        "method" => method.clone(),
        "status" => status,
        "provider" => provider
    )
    .increment(1);

    histogram!("admin_http_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record one `WWW-Authenticate` challenge.
pub fn record_auth_challenge() {
    counter!("admin_http_auth_challenges_total").increment(1);
}
