//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_dispatch_total` (counter): dispatches by source, outcome
//! - `relay_dispatch_duration_seconds` (histogram): outbound latency by source
//! - `relay_body_attachments_total` (counter): bodies shipped as files
//! - `relay_websocket_sessions_active` (gauge): open bridge sessions
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::relay::dispatch::DispatchSource;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(source: DispatchSource, outcome: &'static str, start_time: Instant) {
    metrics::counter!(
        "relay_dispatch_total",
        "source" => source.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("relay_dispatch_duration_seconds", "source" => source.as_str())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_body_attachment() {
    metrics::counter!("relay_body_attachments_total").increment(1);
}

pub fn session_opened() {
    metrics::gauge!("relay_websocket_sessions_active").increment(1.0);
}

pub fn session_closed() {
    metrics::gauge!("relay_websocket_sessions_active").decrement(1.0);
}
