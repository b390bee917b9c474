//! Metrics for the prediction service
//!
//! Prometheus instrumentation: latency histograms for the two orchestrated
//! paths plus counters and gauges describing the loaded model.

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for per-request prediction latency (in seconds)
const PREDICTION_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Histogram buckets for whole training runs (in seconds)
const TRAINING_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PipelineMetricsInner> = OnceLock::new();

struct PipelineMetricsInner {
    prediction_latency_seconds: Histogram,
    training_duration_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    training_runs_total: IntCounter,
    training_failures_total: IntCounter,
    model_feature_count: IntGauge,
    model_training_samples: IntGauge,
    model_training_rmse: Gauge,
}

impl PipelineMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "pitwall_prediction_latency_seconds",
                "Time spent producing one lap-time prediction",
                PREDICTION_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            training_duration_seconds: register_histogram!(
                "pitwall_training_duration_seconds",
                "Wall time of a full training run",
                TRAINING_BUCKETS.to_vec()
            )
            .expect("Failed to register training_duration_seconds"),

            predictions_total: register_int_counter!(
                "pitwall_predictions_total",
                "Total number of lap-time predictions served"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "pitwall_prediction_errors_total",
                "Total number of failed prediction requests"
            )
            .expect("Failed to register prediction_errors_total"),

            training_runs_total: register_int_counter!(
                "pitwall_training_runs_total",
                "Total number of training runs started"
            )
            .expect("Failed to register training_runs_total"),

            training_failures_total: register_int_counter!(
                "pitwall_training_failures_total",
                "Total number of training runs that failed"
            )
            .expect("Failed to register training_failures_total"),

            model_feature_count: register_int_gauge!(
                "pitwall_model_feature_count",
                "Number of features in the currently published model"
            )
            .expect("Failed to register model_feature_count"),

            model_training_samples: register_int_gauge!(
                "pitwall_model_training_samples",
                "Number of laps the current model was trained on"
            )
            .expect("Failed to register model_training_samples"),

            model_training_rmse: register_gauge!(
                "pitwall_model_training_rmse",
                "Training RMSE of the currently published model (seconds)"
            )
            .expect("Failed to register model_training_rmse"),
        }
    }
}

/// Lightweight handle to the global metrics instance; clones share the
/// same underlying registry.
#[derive(Clone)]
pub struct PipelineMetrics {
    _private: (),
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PipelineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn observe_training_duration(&self, duration_secs: f64) {
        self.inner().training_duration_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn inc_training_runs(&self) {
        self.inner().training_runs_total.inc();
    }

    pub fn inc_training_failures(&self) {
        self.inner().training_failures_total.inc();
    }

    /// Describe the freshly published model.
    pub fn set_model_info(&self, feature_count: usize, samples: usize, rmse: f64) {
        self.inner().model_feature_count.set(feature_count as i64);
        self.inner().model_training_samples.set(samples as i64);
        self.inner().model_training_rmse.set(rmse);
    }
}
