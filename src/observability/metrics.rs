//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_executions_total` (counter): executions by outcome, status
//! - `proxy_execution_duration_seconds` (histogram): end-to-end latency
//! - `proxy_tenant_cache_total` (counter): cache lookups by result
//!   (hit, miss, stale)
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels for outcome and status code; tenant ids are left out to keep
//!   cardinality bounded

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished execution.
pub fn record_execution(outcome: &'static str, status: u16, elapsed: Duration) {
    counter!(
        "proxy_executions_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_execution_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

/// Record a tenant cache lookup.
pub fn record_cache_lookup(result: &'static str) {
    counter!("proxy_tenant_cache_total", "result" => result).increment(1);
}
