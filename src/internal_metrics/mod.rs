//! # Internal Metrics Module
//!
//! Counters and histograms describing alert traffic, recorded through the
//! `metrics` facade. When no recorder is installed every call is a no-op;
//! `install_prometheus_recorder` installs the Prometheus exporter whose handle
//! the HTTP server renders on `/metrics`.

use crate::core::Destination;
use anyhow::{Context, Result};
use metrics::{Counter, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Buckets for outbound dispatch latency, in seconds.
const DISPATCH_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// The public API for the metrics system.
#[derive(Clone)]
pub struct Metrics {
    pub alerts_received_total: Counter,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Registers descriptions for all metrics with the global recorder and
    /// returns the handles used by the alert handler.
    pub fn new() -> Self {
        metrics::describe_counter!("alerts_received_total", Unit::Count, "Total number of alerts received on the alert endpoint.");
        metrics::describe_counter!("alerts_routed_total", Unit::Count, "Total number of alerts delivered, labeled by destination.");
        metrics::describe_counter!("alerts_failed_total", Unit::Count, "Total number of alerts that could not be routed or delivered, labeled by reason.");
        metrics::describe_histogram!("dispatch_duration_seconds", Unit::Seconds, "Time taken to render and deliver an alert, successful or not, labeled by destination.");

        Self {
            alerts_received_total: metrics::counter!("alerts_received_total"),
        }
    }

    pub fn record_routed(&self, destination: &Destination) {
        metrics::counter!("alerts_routed_total", "destination" => destination.to_string()).increment(1);
    }

    pub fn record_failure(&self, reason: &'static str) {
        metrics::counter!("alerts_failed_total", "reason" => reason).increment(1);
    }

    pub fn record_dispatch_duration(&self, destination: &Destination, seconds: f64) {
        metrics::histogram!("dispatch_duration_seconds", "destination" => destination.to_string())
            .record(seconds);
    }
}

/// Installs the Prometheus recorder as the global metrics recorder.
///
/// May only succeed once per process.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("dispatch_duration_seconds".to_string()),
            DISPATCH_BUCKETS,
        )?
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}
