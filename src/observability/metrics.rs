//! Metrics collection and exposition.
//!
//! # Metrics
//! - `zlb_api_requests_total` (counter): requests by method, route, status
//! - `zlb_api_request_duration_seconds` (histogram): latency by method, route
//! - `zlb_store_operations_total` (counter): store calls by op, outcome
//!
//! Without an installed recorder every call is a no-op, so tests and the
//! memory store pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "zlb_api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "zlb_api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_store_operation(op: &'static str, outcome: &'static str) {
    counter!("zlb_store_operations_total", "op" => op, "outcome" => outcome).increment(1);
}
