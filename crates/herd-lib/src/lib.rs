//! Herd engine library
//!
//! This crate provides the core functionality for:
//! - Milk yield prediction (trained forest or linear fallback)
//! - Mastitis risk assessment (trained forest or weighted score)
//! - Model registry with silent fallback to the heuristics
//! - Offline training from historical CSV tables
//! - Health checks and observability

pub mod artifact;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod registry;
pub mod trainer;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{Engine, EngineResponse};
pub use error::{ArtifactError, EngineError, PipelineError, TrainingError, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use registry::{ModelRegistry, ModelState, ModelStatus};
pub use trainer::{Trainer, TrainerConfig, TrainingReport};
