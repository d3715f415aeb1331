//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webdraw_requests_total` (counter): responses sent, by status code
//! - `webdraw_connections_active` (gauge): currently open connections
//! - `webdraw_sessions_active` (gauge): sessions in the registry

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its scrape endpoint. Failure is
/// logged, not fatal: the server runs fine without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint up"),
        Err(err) => tracing::error!(error = %err, "failed to install metrics exporter"),
    }

    metrics::describe_counter!(
        "webdraw_requests_total",
        "Responses sent, labeled by status code"
    );
    metrics::describe_gauge!("webdraw_connections_active", "Currently open connections");
    metrics::describe_gauge!("webdraw_sessions_active", "Sessions in the registry");
}

/// Record one completed response.
pub fn record_request(status: u16) {
    let labels = [("status", status.to_string())];
    metrics::counter!("webdraw_requests_total", &labels).increment(1);
}

pub fn connection_opened() {
    metrics::gauge!("webdraw_connections_active").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("webdraw_connections_active").decrement(1.0);
}

pub fn set_sessions_active(count: usize) {
    metrics::gauge!("webdraw_sessions_active").set(count as f64);
}
