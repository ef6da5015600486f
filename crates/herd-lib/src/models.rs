//! Core data models for the herd engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feeding, environment and milking inputs for one cow-day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldObservation {
    pub feed_kg: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub milking_time_min: f64,
}

/// Internal/external reading pair for one udder quadrant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadrantReading {
    pub internal: f64,
    pub external: f64,
}

impl QuadrantReading {
    pub fn new(internal: f64, external: f64) -> Self {
        Self { internal, external }
    }
}

/// The eight udder sensor readings, one pair per quadrant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UdderSensors {
    pub front_left: QuadrantReading,
    pub front_right: QuadrantReading,
    pub rear_left: QuadrantReading,
    pub rear_right: QuadrantReading,
}

impl UdderSensors {
    /// Quadrants in front-left, front-right, rear-left, rear-right order
    pub fn quadrants(&self) -> [QuadrantReading; 4] {
        [self.front_left, self.front_right, self.rear_left, self.rear_right]
    }

    /// Raw readings laid out as IUFL, EUFL, IUFR, EUFR, IURL, EURL, IURR, EURR
    pub fn raw(&self) -> [f64; 8] {
        let [fl, fr, rl, rr] = self.quadrants();
        [
            fl.internal,
            fl.external,
            fr.internal,
            fr.external,
            rl.internal,
            rl.external,
            rr.internal,
            rr.external,
        ]
    }
}

/// Clinical and sensor inputs for a mastitis screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseObservation {
    pub cow_id: String,
    pub day: u32,
    pub months_after_birth: u32,
    pub previous_mastitis: bool,
    pub temperature_c: f64,
    pub breed: String,
    pub sensors: UdderSensors,
}

/// Predicted milk yield returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_liters: f64,
    pub confidence_label: String,
}

/// Discrete mastitis risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mastitis screening result returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub risk_level: RiskLevel,
    pub probability: f64,
    pub recommendations: Vec<String>,
}

/// Which trained model an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Yield,
    Disease,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Yield, ModelKind::Disease];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Yield => "yield",
            ModelKind::Disease => "disease",
        }
    }

    /// File name of the artifact inside the model directory
    pub fn artifact_file(&self) -> &'static str {
        match self {
            ModelKind::Yield => "milk_production_model.json",
            ModelKind::Disease => "cattle_disease_detector.json",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionPath {
    Trained,
    Heuristic,
}

impl PredictionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionPath::Trained => "trained",
            PredictionPath::Heuristic => "heuristic",
        }
    }
}
