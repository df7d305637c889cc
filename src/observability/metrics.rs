//! Metrics collection and exposition.
//!
//! # Metrics
//! - `data_receiver_requests_total` (counter): requests by route, status
//! - `data_receiver_request_duration_seconds` (histogram): handler latency
//!
//! Without an installed recorder the macros are no-ops, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one handled request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "data_receiver_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("data_receiver_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
