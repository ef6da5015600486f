//! Prediction output post-processing
//!
//! Clamps yield predictions to the plausible per-cow envelope, attaches
//! confidence labels, and discretizes risk scores into levels with their
//! recommendation lists.

use crate::models::{PredictionResult, RiskLevel, RiskResult};

/// Lowest plausible daily yield per cow in liters
pub const MIN_YIELD_LITERS: f64 = 5.0;

/// Highest plausible daily yield per cow in liters
pub const MAX_YIELD_LITERS: f64 = 30.0;

/// Scores at or above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Scores at or above this (and below high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Ceiling on the reported probability for high risk
pub const MAX_REPORTED_PROBABILITY: f64 = 0.95;

/// Floor on the reported probability for low risk
pub const MIN_REPORTED_PROBABILITY: f64 = 0.05;

/// Confidence label used when the linear fallback produced the yield
pub const HEURISTIC_CONFIDENCE_LABEL: &str = "Moderate (heuristic estimate, no trained model)";

const HIGH_RISK_RECOMMENDATIONS: &[&str] = &[
    "Immediate veterinary consultation required",
    "Isolate the animal from the herd",
    "Check for clinical signs of mastitis",
    "Monitor temperature and milk quality closely",
];

const MEDIUM_RISK_RECOMMENDATIONS: &[&str] = &[
    "Schedule veterinary check-up within 24-48 hours",
    "Increase monitoring frequency",
    "Check udder health and milk quality",
    "Consider preventive treatment",
];

const LOW_RISK_RECOMMENDATIONS: &[&str] = &[
    "Continue regular monitoring",
    "Maintain good hygiene practices",
    "Monitor for any changes in behavior or milk production",
];

/// Ordered recommendations for a risk level
pub fn recommendations(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::High => HIGH_RISK_RECOMMENDATIONS,
        RiskLevel::Medium => MEDIUM_RISK_RECOMMENDATIONS,
        RiskLevel::Low => LOW_RISK_RECOMMENDATIONS,
    }
}

/// Discretizes a raw risk score or model probability
pub struct RiskClassifier;

impl RiskClassifier {
    pub fn level(score: f64) -> RiskLevel {
        if score >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Probability reported for `score` at its level
    pub fn reported_probability(score: f64, level: RiskLevel) -> f64 {
        match level {
            RiskLevel::High => score.min(MAX_REPORTED_PROBABILITY),
            RiskLevel::Medium => score,
            RiskLevel::Low => score.max(MIN_REPORTED_PROBABILITY),
        }
    }

    /// Callers must reject non-finite scores first.
    pub fn classify(score: f64) -> RiskResult {
        let risk_level = Self::level(score);
        RiskResult {
            risk_level,
            probability: Self::reported_probability(score, risk_level),
            recommendations: recommendations(risk_level)
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Clamp a raw yield into the plausible envelope
pub fn clamp_yield(liters: f64) -> f64 {
    liters.clamp(MIN_YIELD_LITERS, MAX_YIELD_LITERS)
}

/// Qualitative label for a trained yield model's evaluation R²
pub fn trained_confidence_label(r2: f64) -> String {
    let grade = if r2 >= 0.9 {
        "High"
    } else if r2 >= 0.7 {
        "Moderate"
    } else {
        "Low"
    };
    format!("{} (trained model, R² {:.3})", grade, r2)
}

pub(crate) fn yield_result(raw_liters: f64, confidence_label: String) -> PredictionResult {
    PredictionResult {
        predicted_liters: clamp_yield(raw_liters),
        confidence_label,
    }
}
