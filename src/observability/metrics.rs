//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hammer_flushes_total` (counter): provider calls, by provider
//! - `hammer_batch_size` (histogram): addresses per call, by provider
//! - `hammer_provider_errors_total` (counter): failed calls, by provider and kind
//! - `hammer_results_total` (counter): balances published, by provider
//! - `hammer_addresses_requeued_total` (counter): addresses sent back to the queue
//! - `hammer_addresses_abandoned_total` (counter): addresses past the retry limit
//! - `hammer_quota_used` (gauge): addresses spent in the current hourly window
//!
//! Recording is a no-op until a recorder is installed.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_flush(provider: &str, size: usize) {
    counter!("hammer_flushes_total", "provider" => provider.to_string()).increment(1);
    histogram!("hammer_batch_size", "provider" => provider.to_string()).record(size as f64);
}

pub fn record_provider_error(provider: &str, kind: &'static str) {
    counter!("hammer_provider_errors_total", "provider" => provider.to_string(), "kind" => kind).increment(1);
}

pub fn record_result(provider: &str) {
    counter!("hammer_results_total", "provider" => provider.to_string()).increment(1);
}

pub fn record_requeued(count: usize) {
    counter!("hammer_addresses_requeued_total").increment(count as u64);
}

pub fn record_abandoned(count: usize) {
    if count > 0 {
        counter!("hammer_addresses_abandoned_total").increment(count as u64);
    }
}

pub fn record_quota_used(provider: &str, used: u32) {
    gauge!("hammer_quota_used", "provider" => provider.to_string()).set(f64::from(used));
}
