//! Observability infrastructure for the herd engine
//!
//! Provides:
//! - Prometheus metrics (prediction latency, predictions by path, failures, model state)
//! - Structured JSON logging with tracing

use crate::models::{ModelKind, PredictionPath};
use crate::registry::ModelState;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    prediction_latency_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    prediction_failures_total: IntCounterVec,
    model_loaded: IntGaugeVec,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram_vec!(
                "herd_prediction_latency_seconds",
                "Time spent producing a prediction",
                &["kind"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "herd_predictions_total",
                "Predictions served, by model kind and path",
                &["kind", "path"]
            )
            .expect("Failed to register predictions_total"),

            prediction_failures_total: register_int_counter_vec!(
                "herd_prediction_failures_total",
                "Requests answered with a failure result",
                &["kind"]
            )
            .expect("Failed to register prediction_failures_total"),

            model_loaded: register_int_gauge_vec!(
                "herd_model_loaded",
                "1 when a trained model serves the kind, 0 on the heuristic",
                &["kind"]
            )
            .expect("Failed to register model_loaded"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, kind: ModelKind, duration_secs: f64) {
        self.inner()
            .prediction_latency_seconds
            .with_label_values(&[kind.as_str()])
            .observe(duration_secs);
    }

    pub fn inc_predictions(&self, kind: ModelKind, path: PredictionPath) {
        self.inner()
            .predictions_total
            .with_label_values(&[kind.as_str(), path.as_str()])
            .inc();
    }

    pub fn inc_prediction_failures(&self, kind: ModelKind) {
        self.inner()
            .prediction_failures_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn set_model_state(&self, kind: ModelKind, state: ModelState) {
        let loaded = i64::from(state == ModelState::Loaded);
        self.inner()
            .model_loaded
            .with_label_values(&[kind.as_str()])
            .set(loaded);
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    node_name: String,
}

impl StructuredLogger {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_dir: &str) {
        info!(
            event = "service_started",
            node = %self.node_name,
            service_version = %version,
            model_dir = %model_dir,
            "Herd engine started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            node = %self.node_name,
            reason = %reason,
            "Herd engine shutting down"
        );
    }

    pub fn log_model_state(&self, kind: ModelKind, state: ModelState, version: Option<&str>) {
        match state {
            ModelState::Loaded => info!(
                event = "model_state",
                node = %self.node_name,
                kind = %kind,
                state = ?state,
                version = version.unwrap_or("unknown"),
                "Serving trained model"
            ),
            _ => warn!(
                event = "model_state",
                node = %self.node_name,
                kind = %kind,
                state = ?state,
                "Serving heuristic fallback"
            ),
        }
    }

    pub fn log_risk_assessment(&self, cow_id: &str, level: &str, probability: f64, path: PredictionPath) {
        info!(
            event = "risk_assessed",
            node = %self.node_name,
            cow_id = %cow_id,
            risk_level = %level,
            probability = probability,
            path = path.as_str(),
            "Mastitis risk assessed"
        );
    }

    pub fn log_training(&self, kind: ModelKind, metric: &str, value: f64, rows: usize) {
        info!(
            event = "model_trained",
            node = %self.node_name,
            kind = %kind,
            metric = %metric,
            value = value,
            rows = rows,
            "Model trained and persisted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_metrics_creation() {
        let metrics = EngineMetrics::new();
        metrics.observe_prediction_latency(ModelKind::Yield, 0.0001);
        metrics.inc_predictions(ModelKind::Disease, PredictionPath::Heuristic);
        metrics.inc_prediction_failures(ModelKind::Yield);
        metrics.set_model_state(ModelKind::Yield, ModelState::FallbackOnly);

        let families = prometheus::gather();
        assert!(families.iter().any(|f| f.get_name() == "herd_predictions_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("barn-1");
        assert_eq!(logger.node_name, "barn-1");
    }
}
