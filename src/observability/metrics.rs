//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tenant_router_requests_total` (counter): requests by outcome
//! - `tenant_router_request_duration_seconds` (histogram): latency by status
//! - `tenant_router_invariant_violations_total` (counter): refused hosts by reason
//!
//! Without an installed recorder every call is a no-op, so tests and the
//! `resolve` command never need an exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!("tenant_router_requests_total", "outcome" => outcome).increment(1);
    histogram!("tenant_router_request_duration_seconds", "status" => status.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_violation(reason: &'static str) {
    counter!("tenant_router_invariant_violations_total", "reason" => reason).increment(1);
}
