//! Error types for validation, artifacts, training and inference

use crate::models::ModelKind;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected caller input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be {expected}")]
    InvalidType { field: String, expected: &'static str },

    #[error("field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure to turn an artifact file into a callable model
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact holds a {found} model, expected {expected}")]
    KindMismatch { expected: ModelKind, found: ModelKind },

    #[error("checksum mismatch: manifest has {expected}, file has {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("holdout probe mismatch: recorded {recorded}, reproduced {reproduced}")]
    ProbeMismatch { recorded: f64, reproduced: f64 },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Failure inside a fitted standardization + forest pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no rows given")]
    Empty,

    #[error("expected {expected} features per row, got {actual}")]
    Width { expected: usize, actual: usize },

    #[error("{rows} rows but {targets} targets")]
    Length { rows: usize, targets: usize },

    #[error("forest error: {0}")]
    Model(#[from] smartcore::error::Failed),
}

/// Fatal error for one trainer invocation
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: label must be 0 or 1, got {value}")]
    InvalidLabel { row: usize, value: f64 },

    #[error("dataset {0} is empty")]
    EmptyDataset(PathBuf),

    #[error("need at least {required} rows to train, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("model fit failed: {0}")]
    Fit(#[from] PipelineError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Inference failure reported at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0} model produced a non-finite output")]
    NonFinite(ModelKind),
}
