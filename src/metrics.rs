use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and describe the
    /// visibility series. Later calls reuse the same handle.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE.get_or_try_init(|| -> anyhow::Result<PrometheusHandle> {
            // Default buckets; histograms render as summaries.
            let handle = PrometheusBuilder::new().install_recorder()?;
            describe();
            Ok(handle)
        })?;
        Ok(Self {
            handle: handle.clone(),
        })
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

fn describe() {
    describe_counter!("visibility_evaluations_total", "Completed evaluations");
    describe_counter!(
        "visibility_semantic_degraded_total",
        "Evaluations whose semantic signal fell back to 0.0"
    );
    describe_counter!("visibility_jobs_submitted_total", "Accepted query submissions");
    describe_counter!("visibility_jobs_failed_total", "Query jobs that ended in Failed");
    describe_histogram!(
        "visibility_evaluation_ms",
        Unit::Milliseconds,
        "Wall time of one evaluation"
    );
    describe_gauge!("visibility_last_score", "Most recent composite visibility score");
}
