//! Yield and mastitis prediction

mod features;
mod inference;
mod output;
mod pipeline;

pub use features::{
    clip_outliers_iqr, quantile, FeatureDeriver, UdderFeatures, YieldFeatures, DISEASE_FEATURES,
    HUMIDITY_SMOOTHING, YIELD_FEATURES,
};
pub(crate) use features::disease_vector_from_parts;
pub use inference::{
    FallbackRiskScorer, FallbackYieldPredictor, RiskFactors, RiskModel, RiskPrediction,
    YieldModel, YieldPrediction, YIELD_BASE_LITERS,
};
pub use output::{
    clamp_yield, recommendations, trained_confidence_label, RiskClassifier,
    HEURISTIC_CONFIDENCE_LABEL, HIGH_RISK_THRESHOLD, MAX_REPORTED_PROBABILITY, MAX_YIELD_LITERS,
    MEDIUM_RISK_THRESHOLD, MIN_REPORTED_PROBABILITY, MIN_YIELD_LITERS,
};
pub use pipeline::{ForestParams, ForestPipeline, Standardizer, DEFAULT_N_TREES, DEFAULT_SEED};
