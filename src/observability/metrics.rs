//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the kitchen metrics (prep-time histogram, refund counter)
//! - Install the Prometheus recorder and hand out the scrape handle
//! - Record observations behind the MetricsSink seam
//!
//! # Metrics
//! - `smartdine_prep_time_ms` (histogram): simulated prep time, labeled by
//!   region, recipe_version, change_id
//! - `smartdine_refunds_total` (counter): refunds, labeled by region, reason,
//!   change_id
//!
//! # Design Decisions
//! - Metric updates are atomic increments; safe under concurrent orders
//! - Bucket bounds are tuned for the 20..2000ms simulated latency range

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const PREP_TIME_HISTOGRAM: &str = "smartdine_prep_time_ms";
pub const REFUNDS_COUNTER: &str = "smartdine_refunds_total";

const PREP_TIME_BUCKETS: &[f64] = &[
    50.0, 80.0, 120.0, 180.0, 250.0, 350.0, 500.0, 800.0, 1200.0, 2000.0,
];

/// Destination for per-order metric observations.
pub trait MetricsSink: Send + Sync {
    fn observe_prep_time(&self, region: &str, recipe_version: &str, change_id: &str, ms: u64);
    fn record_refund(&self, region: &str, reason: &str, change_id: &str);
}

/// Production sink writing to the installed Prometheus recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn observe_prep_time(&self, region: &str, recipe_version: &str, change_id: &str, ms: u64) {
        histogram!(
            PREP_TIME_HISTOGRAM,
            "region" => region.to_string(),
            "recipe_version" => recipe_version.to_string(),
            "change_id" => change_id.to_string()
        )
        .record(ms as f64);
    }

    fn record_refund(&self, region: &str, reason: &str, change_id: &str) {
        counter!(
            REFUNDS_COUNTER,
            "region" => region.to_string(),
            "reason" => reason.to_string(),
            "change_id" => change_id.to_string()
        )
        .increment(1);
    }
}

/// Install the global Prometheus recorder and return the scrape handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(PREP_TIME_HISTOGRAM.to_string()),
            PREP_TIME_BUCKETS,
        )?
        .install_recorder()
}
