//! Prometheus metrics wiring.
//!
//! Installs the global `metrics` recorder once at startup and registers
//! descriptions for every metric the hub emits. The rendered exposition
//! text is served by the `/metrics` route.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::HubError;

/// Installs the Prometheus recorder and registers metric descriptions.
///
/// Call once at server startup, before any metrics are recorded.
///
/// # Errors
///
/// Returns [`HubError::Internal`] if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, HubError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| HubError::Internal(format!("metrics recorder install failed: {e}")))?;

    describe_counter!("quakes_ingested_total", "Total quakes ingested");
    describe_counter!("alerts_emitted_total", "Total alerts emitted");
    describe_counter!(
        "feed_records_dropped_total",
        "Feed records dropped during normalization"
    );
    describe_gauge!("last_ingest_timestamp", "Last ingest epoch millis");
    describe_histogram!("ingest_duration_seconds", "Ingest cycle duration");

    Ok(handle)
}
