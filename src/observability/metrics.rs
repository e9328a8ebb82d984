//! Metrics collection and exposition.
//!
//! # Metrics
//! - `intake_submissions_total` (counter): terminal states, by `outcome`
//! - `intake_delivery_duration_seconds` (histogram): sink latency, by `sink` and `result`
//! - `intake_rate_limit_entries` (gauge): keys held after the last sweep
//! - `intake_rate_limit_swept_total` (counter): keys evicted by the reaper

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_submission(outcome: &'static str) {
    metrics::counter!("intake_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_delivery(sink: &'static str, start: Instant, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::histogram!("intake_delivery_duration_seconds", "sink" => sink, "result" => result)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_sweep(removed: usize, remaining: usize) {
    metrics::counter!("intake_rate_limit_swept_total").increment(removed as u64);
    metrics::gauge!("intake_rate_limit_entries").set(remaining as f64);
}
