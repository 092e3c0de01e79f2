//! Prometheus metrics for the job queue

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder.
///
/// Call this once at startup. Subsequent calls are no-ops. If another
/// recorder is already installed, metrics are simply not exported.
pub fn init_metrics() {
    if PROMETHEUS_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_ok() {
                info!("Prometheus metrics initialized");
            }
        }
        Err(e) => warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the Prometheus handle for rendering metrics
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    prometheus_handle()
        .map(|h| h.render())
        .unwrap_or_default()
}

/// Record the outcome of one work-queue delivery
pub fn record_outcome(queue: &str, outcome: &'static str) {
    counter!(
        "job_queue_jobs_total",
        "queue" => queue.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a job read off the dead-letter queue
pub fn record_dead_job(queue: &str) {
    counter!("job_queue_dead_jobs_total", "queue" => queue.to_string()).increment(1);
}

/// Record a retry whose republish failed after the original was acked
pub fn record_lost_job(queue: &str) {
    counter!("job_queue_lost_jobs_total", "queue" => queue.to_string()).increment(1);
}

/// Record a confirmed publish
pub fn record_published(queue: &str) {
    counter!("job_queue_published_total", "queue" => queue.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_counters() {
        init_metrics();
        init_metrics();

        record_outcome("jobs", "succeeded");
        record_lost_job("jobs");

        let text = render_metrics();
        assert!(text.contains("job_queue_jobs_total"));
        assert!(text.contains("job_queue_lost_jobs_total"));
        assert!(text.contains(r#"outcome="succeeded""#));
    }
}
