//! Inference entry points
//!
//! The engine owns the model registry and is the only surface external
//! callers (HTTP service, CLI) talk to. Every failure on the inference path
//! is turned into a uniform `success: false` response here.

use crate::error::EngineError;
use crate::models::{
    DiseaseObservation, ModelKind, PredictionResult, RiskResult, YieldObservation,
};
use crate::observability::EngineMetrics;
use crate::registry::ModelRegistry;
use crate::validation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome returned to external callers, ready for serialization
///
/// Serializes as `{"success": true, ..result fields}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> EngineResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn from_result(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Stateless inference engine over an initialized registry
pub struct Engine {
    registry: ModelRegistry,
    metrics: EngineMetrics,
}

impl Engine {
    pub fn new(registry: ModelRegistry) -> Self {
        let metrics = EngineMetrics::new();
        for kind in ModelKind::ALL {
            metrics.set_model_state(kind, registry.state(kind));
        }
        Self { registry, metrics }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Predict daily milk yield for a typed observation
    pub fn predict_yield(&self, obs: &YieldObservation) -> Result<PredictionResult, EngineError> {
        let start = Instant::now();
        let outcome = obs
            .validate()
            .map_err(EngineError::from)
            .and_then(|_| self.registry.yield_model().predict(obs));
        self.metrics
            .observe_prediction_latency(ModelKind::Yield, start.elapsed().as_secs_f64());

        match outcome {
            Ok(prediction) => {
                self.metrics.inc_predictions(ModelKind::Yield, prediction.path);
                let mut result = prediction.result;
                result.predicted_liters = round_to(result.predicted_liters, 2);
                Ok(result)
            }
            Err(e) => {
                self.metrics.inc_prediction_failures(ModelKind::Yield);
                debug!(error = %e, "Yield prediction rejected");
                Err(e)
            }
        }
    }

    /// Assess mastitis risk for a typed observation
    pub fn predict_disease(&self, obs: &DiseaseObservation) -> Result<RiskResult, EngineError> {
        let start = Instant::now();
        let outcome = obs
            .validate()
            .map_err(EngineError::from)
            .and_then(|_| self.registry.risk_model().predict(obs));
        self.metrics
            .observe_prediction_latency(ModelKind::Disease, start.elapsed().as_secs_f64());

        match outcome {
            Ok(prediction) => {
                self.metrics.inc_predictions(ModelKind::Disease, prediction.path);
                debug!(
                    cow_id = %obs.cow_id,
                    score = prediction.score,
                    risk_level = %prediction.result.risk_level,
                    "Risk assessed"
                );
                let mut result = prediction.result;
                result.probability = round_to(result.probability, 3);
                Ok(result)
            }
            Err(e) => {
                self.metrics.inc_prediction_failures(ModelKind::Disease);
                warn!(cow_id = %obs.cow_id, error = %e, "Risk assessment failed");
                Err(e)
            }
        }
    }

    /// Untyped yield entry point for external callers
    pub fn handle_yield(&self, body: &Value) -> EngineResponse<PredictionResult> {
        let result = validation::parse_yield(body)
            .map_err(|e| self.rejected(ModelKind::Yield, e.into()))
            .and_then(|obs| self.predict_yield(&obs));
        EngineResponse::from_result(result)
    }

    /// Untyped disease entry point for external callers
    pub fn handle_disease(&self, body: &Value) -> EngineResponse<RiskResult> {
        let result = validation::parse_disease(body)
            .map_err(|e| self.rejected(ModelKind::Disease, e.into()))
            .and_then(|obs| self.predict_disease(&obs));
        EngineResponse::from_result(result)
    }

    fn rejected(&self, kind: ModelKind, error: EngineError) -> EngineError {
        self.metrics.inc_prediction_failures(kind);
        debug!(kind = %kind, error = %error, "Request rejected");
        error
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::RiskLevel;
    use serde_json::json;
    use tempfile::TempDir;

    fn fallback_engine() -> Engine {
        Engine::new(ModelRegistry::fallback_only())
    }

    fn disease_body(temperature: f64, previous: bool, months: u32) -> Value {
        json!({
            "cow_id": "COW042",
            "day": 3,
            "months_after_birth": months,
            "previous_mastitis": previous,
            "temperature_c": temperature,
            "breed": "Jersey",
            "front_left_internal": 0.85,
            "front_left_external": 0.50,
            "front_right_internal": 0.40,
            "front_right_external": 0.40,
            "rear_left_internal": 0.40,
            "rear_left_external": 0.40,
            "rear_right_internal": 0.40,
            "rear_right_external": 0.40
        })
    }

    #[test]
    fn test_handle_yield_success() {
        let engine = fallback_engine();
        let response = engine.handle_yield(&json!({
            "feed_kg": 12.0,
            "temperature_c": 25.0,
            "humidity_pct": 60.0,
            "milking_time_min": 15.0
        }));
        assert!(response.success);
        let result = response.result.unwrap();
        assert_eq!(result.predicted_liters, 27.56);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_handle_yield_failure_has_no_numbers() {
        let engine = fallback_engine();
        let response = engine.handle_yield(&json!({"feed_kg": "abc"}));
        assert!(!response.success);
        assert!(response.result.is_none());

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("feed_kg"));
        assert!(body.get("predicted_liters").is_none());
    }

    #[test]
    fn test_handle_disease_high_risk() {
        let engine = fallback_engine();
        let response = engine.handle_disease(&disease_body(40.0, true, 1));
        assert!(response.success);
        let result = response.result.unwrap();
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.probability, 0.95);
        assert_eq!(result.recommendations.len(), 4);
    }

    #[test]
    fn test_handle_disease_serialized_shape() {
        let engine = fallback_engine();
        let response = engine.handle_disease(&disease_body(37.0, false, 10));
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["success"], json!(true));
        // front-left asymmetry of 0.35 alone scores 0.3
        assert_eq!(body["risk_level"], json!("low"));
        assert_eq!(body["probability"], json!(0.3));
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_missing_sensor_is_client_error() {
        let engine = fallback_engine();
        let mut body = disease_body(38.0, false, 5);
        body.as_object_mut().unwrap().remove("front_left_internal");
        let response = engine.handle_disease(&body);
        assert!(!response.success);
        assert!(response.error.unwrap().contains("front_left_internal"));
    }

    #[test]
    fn test_typed_entry_validates() {
        let engine = fallback_engine();
        let obs = YieldObservation {
            feed_kg: -1.0,
            temperature_c: 20.0,
            humidity_pct: 50.0,
            milking_time_min: 10.0,
        };
        assert!(matches!(
            engine.predict_yield(&obs),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_artifacts_still_serve() {
        let temp_dir = TempDir::new().unwrap();
        let registry = ModelRegistry::load(EngineConfig::with_model_dir(temp_dir.path()));
        let engine = Engine::new(registry);
        assert!(!engine.registry().is_available(ModelKind::Yield));

        let response = engine.handle_yield(&json!({
            "feed_kg": 1000.0,
            "temperature_c": 25.0,
            "humidity_pct": 60.0,
            "milking_time_min": 15.0
        }));
        assert!(response.success);
        assert_eq!(response.result.unwrap().predicted_liters, 30.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(27.561_475, 2), 27.56);
        assert_eq!(round_to(0.123_456, 3), 0.123);
    }
}
