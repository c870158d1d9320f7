//! Prometheus Metrics

use crate::error::ApiError;
use inference_engine::Verdict;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub const SCANS_TOTAL: &str = "phishguard_scans_total";
pub const DEFAULTED_ROWS_TOTAL: &str = "phishguard_defaulted_rows_total";
pub const SCAN_SECONDS: &str = "phishguard_scan_seconds";

/// Install the global Prometheus recorder
pub fn install() -> Result<PrometheusHandle, ApiError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Startup(format!("metrics recorder: {}", e)))?;

    describe_counter!(SCANS_TOTAL, "Completed scans by verdict");
    describe_counter!(DEFAULTED_ROWS_TOTAL, "Scans scored on the default feature row");
    describe_histogram!(SCAN_SECONDS, Unit::Seconds, "End-to-end scan latency");

    Ok(handle)
}

/// Record a completed scan
pub fn record_scan(verdict: Verdict, defaulted: bool, elapsed: Duration) {
    counter!(SCANS_TOTAL, "result" => verdict.as_str()).increment(1);
    if defaulted {
        counter!(DEFAULTED_ROWS_TOTAL).increment(1);
    }
    histogram!(SCAN_SECONDS).record(elapsed.as_secs_f64());
}
