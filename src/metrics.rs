use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and expose a static gauge for the
    /// poll interval.
    pub fn init(poll_interval_secs: u64) -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!("poll_runs_total", "Completed background poll ticks.");
        describe_gauge!("poll_last_run_ts", "Unix timestamp of the last poll tick.");
        describe_counter!("alerts_emitted_total", "Alerts raised by the scanner.");
        describe_counter!(
            "alerts_suppressed_total",
            "Alerts swallowed by the cooldown."
        );

        gauge!("poll_interval_secs").set(poll_interval_secs as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
