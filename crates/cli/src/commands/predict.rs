//! One-off prediction commands

use anyhow::Result;
use clap::Args;
use herd_lib::{
    DiseaseObservation, Engine, EngineResponse, ModelKind, QuadrantReading, UdderSensors,
    YieldObservation,
};
use std::path::Path;
use tabled::Tabled;

use super::load_registry;
use crate::output::{color_risk, format_probability, print_error, print_json, print_table, OutputFormat};

/// Clinical and sensor inputs for a mastitis screening
#[derive(Debug, Args)]
pub struct DiseaseArgs {
    #[arg(long)]
    pub cow_id: String,

    /// Observation day, starting at 1
    #[arg(long, default_value_t = 1)]
    pub day: u32,

    #[arg(long)]
    pub months_after_birth: u32,

    /// The cow had mastitis before
    #[arg(long)]
    pub previous_mastitis: bool,

    #[arg(long)]
    pub temperature_c: f64,

    #[arg(long, default_value = "unknown")]
    pub breed: String,

    /// Front-left internal, front-left external (IUFL EUFL)
    #[arg(long, required = true, num_args = 2, value_names = ["INTERNAL", "EXTERNAL"])]
    pub front_left: Vec<f64>,

    /// Front-right internal, front-right external (IUFR EUFR)
    #[arg(long, required = true, num_args = 2, value_names = ["INTERNAL", "EXTERNAL"])]
    pub front_right: Vec<f64>,

    /// Rear-left internal, rear-left external (IURL EURL)
    #[arg(long, required = true, num_args = 2, value_names = ["INTERNAL", "EXTERNAL"])]
    pub rear_left: Vec<f64>,

    /// Rear-right internal, rear-right external (IURR EURR)
    #[arg(long, required = true, num_args = 2, value_names = ["INTERNAL", "EXTERNAL"])]
    pub rear_right: Vec<f64>,
}

impl DiseaseArgs {
    pub fn into_observation(self) -> DiseaseObservation {
        let pair = |v: &[f64]| QuadrantReading::new(v[0], v[1]);
        DiseaseObservation {
            sensors: UdderSensors {
                front_left: pair(&self.front_left),
                front_right: pair(&self.front_right),
                rear_left: pair(&self.rear_left),
                rear_right: pair(&self.rear_right),
            },
            cow_id: self.cow_id,
            day: self.day,
            months_after_birth: self.months_after_birth,
            previous_mastitis: self.previous_mastitis,
            temperature_c: self.temperature_c,
            breed: self.breed,
        }
    }
}

#[derive(Tabled)]
struct YieldRow {
    #[tabled(rename = "Predicted (L)")]
    liters: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

#[derive(Tabled)]
struct RiskRow {
    #[tabled(rename = "Cow")]
    cow_id: String,
    #[tabled(rename = "Risk")]
    risk_level: String,
    #[tabled(rename = "Probability")]
    probability: String,
}

fn engine(model_dir: &Path) -> Engine {
    Engine::new(load_registry(model_dir))
}

pub fn predict_yield(model_dir: &Path, obs: &YieldObservation, format: OutputFormat) -> Result<()> {
    let engine = engine(model_dir);
    let result = engine.predict_yield(obs);

    match format {
        OutputFormat::Json => {
            let failed = result.is_err();
            print_json(&EngineResponse::from_result(result))?;
            if failed {
                anyhow::bail!("{} prediction failed", ModelKind::Yield);
            }
        }
        OutputFormat::Table => match result {
            Ok(prediction) => print_table(vec![YieldRow {
                liters: format!("{:.2}", prediction.predicted_liters),
                confidence: prediction.confidence_label,
            }]),
            Err(e) => {
                print_error(&e.to_string());
                return Err(e.into());
            }
        },
    }

    Ok(())
}

pub fn predict_disease(model_dir: &Path, obs: &DiseaseObservation, format: OutputFormat) -> Result<()> {
    let engine = engine(model_dir);
    let result = engine.predict_disease(obs);

    match format {
        OutputFormat::Json => {
            let failed = result.is_err();
            print_json(&EngineResponse::from_result(result))?;
            if failed {
                anyhow::bail!("{} prediction failed", ModelKind::Disease);
            }
        }
        OutputFormat::Table => match result {
            Ok(risk) => {
                print_table(vec![RiskRow {
                    cow_id: obs.cow_id.clone(),
                    risk_level: color_risk(risk.risk_level),
                    probability: format_probability(risk.probability),
                }]);
                println!("\nRecommendations:");
                for recommendation in &risk.recommendations {
                    println!("  - {}", recommendation);
                }
            }
            Err(e) => {
                print_error(&e.to_string());
                return Err(e.into());
            }
        },
    }

    Ok(())
}
