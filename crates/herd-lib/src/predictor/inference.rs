//! Dual-path inference for the yield and mastitis models
//!
//! Each model is a tagged union: a trained forest pipeline borrowed from the
//! registry, or the deterministic heuristic. Callers get the same result
//! shape from both and never branch on which one served them.

use super::features::FeatureDeriver;
use super::output::{self, RiskClassifier, HEURISTIC_CONFIDENCE_LABEL};
use crate::artifact::TrainedArtifact;
use crate::error::EngineError;
use crate::models::{
    DiseaseObservation, ModelKind, PredictionPath, PredictionResult, RiskResult, YieldObservation,
};
use tracing::{debug, warn};

/// Intercept of the linear yield fallback
pub const YIELD_BASE_LITERS: f64 = 5.0;

/// Yield prediction with the path that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct YieldPrediction {
    pub result: PredictionResult,
    pub path: PredictionPath,
}

/// Risk classification with the raw score and the path that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RiskPrediction {
    pub result: RiskResult,
    pub score: f64,
    pub path: PredictionPath,
}

/// Linear fallback used when no trained yield model is available
pub struct FallbackYieldPredictor;

impl FallbackYieldPredictor {
    /// Unclamped linear combination of the raw inputs and the derived ratio
    pub fn raw_liters(obs: &YieldObservation) -> f64 {
        let features = FeatureDeriver::yield_features(obs);
        0.5 * obs.feed_kg
            + 0.3 * obs.temperature_c
            + 0.1 * obs.humidity_pct
            + 0.2 * obs.milking_time_min
            + 0.15 * features.temp_humidity_ratio
            + YIELD_BASE_LITERS
    }

    pub fn predict(obs: &YieldObservation) -> PredictionResult {
        output::yield_result(Self::raw_liters(obs), HEURISTIC_CONFIDENCE_LABEL.to_string())
    }
}

/// Inputs of the additive risk score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFactors {
    pub temperature_c: f64,
    pub previous_mastitis: bool,
    pub max_abs_diff: f64,
    pub months_after_birth: u32,
}

impl RiskFactors {
    pub fn from_observation(obs: &DiseaseObservation) -> Self {
        Self {
            temperature_c: obs.temperature_c,
            previous_mastitis: obs.previous_mastitis,
            max_abs_diff: FeatureDeriver::udder_features(&obs.sensors).max_abs_diff,
            months_after_birth: obs.months_after_birth,
        }
    }
}

/// Weighted-score fallback used when no trained disease model is available
pub struct FallbackRiskScorer;

impl FallbackRiskScorer {
    /// Raw additive score; may exceed 1.0
    pub fn score(factors: &RiskFactors) -> f64 {
        let mut score = 0.0;

        // Body temperature
        if factors.temperature_c > 39.5 {
            score += 0.3;
        } else if factors.temperature_c > 38.5 {
            score += 0.2;
        }

        if factors.previous_mastitis {
            score += 0.4;
        }

        // Quadrant asymmetry
        if factors.max_abs_diff > 0.3 {
            score += 0.3;
        } else if factors.max_abs_diff > 0.2 {
            score += 0.2;
        }

        // Early lactation
        if factors.months_after_birth < 3 {
            score += 0.2;
        }

        score
    }

    pub fn predict(obs: &DiseaseObservation) -> RiskResult {
        RiskClassifier::classify(Self::score(&RiskFactors::from_observation(obs)))
    }
}

/// Yield model selected by registry state
#[derive(Clone, Copy)]
pub enum YieldModel<'a> {
    Trained(&'a TrainedArtifact),
    Fallback,
}

impl YieldModel<'_> {
    pub fn path(&self) -> PredictionPath {
        match self {
            YieldModel::Trained(_) => PredictionPath::Trained,
            YieldModel::Fallback => PredictionPath::Heuristic,
        }
    }

    pub fn predict(&self, obs: &YieldObservation) -> Result<YieldPrediction, EngineError> {
        let prediction = match self {
            YieldModel::Trained(artifact) => {
                let row = FeatureDeriver::yield_features(obs).to_vec();
                match artifact.pipeline.predict_one(&row) {
                    Ok(liters) => YieldPrediction {
                        result: output::yield_result(
                            liters,
                            output::trained_confidence_label(artifact.metadata.evaluation.value),
                        ),
                        path: PredictionPath::Trained,
                    },
                    Err(e) => {
                        warn!(kind = %ModelKind::Yield, error = %e, "Trained inference failed, using fallback");
                        Self::fallback(obs)
                    }
                }
            }
            YieldModel::Fallback => Self::fallback(obs),
        };

        if !prediction.result.predicted_liters.is_finite() {
            return Err(EngineError::NonFinite(ModelKind::Yield));
        }
        debug!(liters = prediction.result.predicted_liters, path = prediction.path.as_str(), "Yield predicted");
        Ok(prediction)
    }

    fn fallback(obs: &YieldObservation) -> YieldPrediction {
        YieldPrediction {
            result: FallbackYieldPredictor::predict(obs),
            path: PredictionPath::Heuristic,
        }
    }
}

/// Risk model selected by registry state
#[derive(Clone, Copy)]
pub enum RiskModel<'a> {
    Trained(&'a TrainedArtifact),
    Fallback,
}

impl RiskModel<'_> {
    pub fn path(&self) -> PredictionPath {
        match self {
            RiskModel::Trained(_) => PredictionPath::Trained,
            RiskModel::Fallback => PredictionPath::Heuristic,
        }
    }

    pub fn predict(&self, obs: &DiseaseObservation) -> Result<RiskPrediction, EngineError> {
        let (score, path) = match self {
            RiskModel::Trained(artifact) => {
                let row = FeatureDeriver::disease_vector(obs);
                match artifact.pipeline.predict_one(&row) {
                    Ok(probability) => (probability.clamp(0.0, 1.0), PredictionPath::Trained),
                    Err(e) => {
                        warn!(kind = %ModelKind::Disease, error = %e, "Trained inference failed, using fallback");
                        Self::fallback_score(obs)
                    }
                }
            }
            RiskModel::Fallback => Self::fallback_score(obs),
        };

        // clamp passes NaN through
        if !score.is_finite() {
            return Err(EngineError::NonFinite(ModelKind::Disease));
        }
        debug!(score, path = path.as_str(), "Risk scored");
        Ok(RiskPrediction {
            result: RiskClassifier::classify(score),
            score,
            path,
        })
    }

    fn fallback_score(obs: &DiseaseObservation) -> (f64, PredictionPath) {
        (
            FallbackRiskScorer::score(&RiskFactors::from_observation(obs)),
            PredictionPath::Heuristic,
        )
    }
}
