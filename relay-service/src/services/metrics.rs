//! Metrics collection for relay-service.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// How a `send-notification` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unauthorized,
    BadRequest,
    Sent,
    Rejected,
    UpstreamError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Unauthorized => "unauthorized",
            Outcome::BadRequest => "bad_request",
            Outcome::Sent => "sent",
            Outcome::Rejected => "rejected",
            Outcome::UpstreamError => "upstream_error",
        }
    }
}

/// Install the global Prometheus recorder.
///
/// Until this runs every `record_*` call is a no-op and `/metrics` reports
/// that no recorder is installed.
pub fn init_metrics() -> Result<(), BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Metrics handle already initialized");
    }

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_notification(outcome: Outcome) {
    counter!("relay_notifications_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_upstream_latency(elapsed: Duration) {
    histogram!("relay_upstream_request_duration_seconds").record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_and_latency_are_recorded() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_notification(Outcome::Sent);
            record_notification(Outcome::Sent);
            record_notification(Outcome::Unauthorized);
            record_upstream_latency(Duration::from_millis(5));
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"relay_notifications_total{outcome="sent"} 2"#));
        assert!(rendered.contains(r#"relay_notifications_total{outcome="unauthorized"} 1"#));
        assert!(rendered.contains("relay_upstream_request_duration_seconds_count 1"));
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(Outcome::UpstreamError.as_str(), "upstream_error");
        assert_eq!(Outcome::BadRequest.as_str(), "bad_request");
    }
}
