//! Prometheus metrics for ticket resolution.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

use ticketd_core::{ResolveError, ResolverStats, Source};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names as constants for consistency.
pub mod names {
    pub const TICKET_RESOLUTIONS_TOTAL: &str = "ticket_resolutions_total";
    pub const TICKET_RESOLUTION_FAILURES_TOTAL: &str = "ticket_resolution_failures_total";
    pub const TICKET_RESOLUTION_DURATION_SECONDS: &str = "ticket_resolution_duration_seconds";
    pub const TIER_IN_FLIGHT: &str = "tier_in_flight";
    pub const TIER_REJECTIONS_TOTAL: &str = "tier_rejections_total";
    pub const TICKETS_ISSUED: &str = "tickets_issued";
}

/// Initialize the Prometheus metrics exporter.
///
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        tracing::debug!("Prometheus metrics already initialized");
        return false;
    }

    // Pull-based: /metrics is served by the app itself
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Failed to store Prometheus handle (already set)");
                return false;
            }
            tracing::info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Render all metrics in Prometheus text format.
///
/// Returns `None` if metrics were not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

/// Record a successful resolution.
pub fn record_resolution(source: Source, duration: Duration) {
    counter!(names::TICKET_RESOLUTIONS_TOTAL, "source" => source.as_str()).increment(1);
    histogram!(names::TICKET_RESOLUTION_DURATION_SECONDS).record(duration.as_secs_f64());
}

/// Record a failed resolution, labelled by its HTTP status.
pub fn record_failure(err: &ResolveError, duration: Duration) {
    counter!(
        names::TICKET_RESOLUTION_FAILURES_TOTAL,
        "code" => err.status_code().to_string()
    )
    .increment(1);
    histogram!(names::TICKET_RESOLUTION_DURATION_SECONDS).record(duration.as_secs_f64());
}

/// Publish per-tier gauges from a resolver snapshot.
pub fn record_tier_stats(stats: &ResolverStats) {
    for tier in [stats.cache, stats.store, stats.compute] {
        let label = tier.tier.as_str();
        gauge!(names::TIER_IN_FLIGHT, "tier" => label).set(tier.in_flight as f64);
        counter!(names::TIER_REJECTIONS_TOTAL, "tier" => label).absolute(tier.rejected);
    }
    gauge!(names::TICKETS_ISSUED).set(stats.tickets_issued as f64);
}
