//! Trained artifact format and on-disk helpers
//!
//! One JSON artifact per model kind plus a combined manifest recording
//! checksums, versions and evaluation figures. Written by the trainer,
//! read by the model registry.

use crate::error::{ArtifactError, TrainingError};
use crate::models::ModelKind;
use crate::predictor::ForestPipeline;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the combined manifest in the model directory
pub const MANIFEST_FILE: &str = "model_manifest.json";

/// Version stamped on artifacts produced by this trainer
pub const ARTIFACT_VERSION: &str = "1.0";

/// Metric a model was evaluated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    R2,
    Accuracy,
}

/// Held-out evaluation of a trained pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub metric: Metric,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roc_auc: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// One held-out row and the prediction observed for it at evaluation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutProbe {
    pub features: Vec<f64>,
    pub prediction: f64,
}

/// Metadata embedded in every artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub kind: ModelKind,
    pub version: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub evaluation: Evaluation,
    pub holdout_probe: HoldoutProbe,
}

/// A fitted pipeline and its metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedArtifact {
    pub metadata: ArtifactMetadata,
    pub pipeline: ForestPipeline,
}

impl TrainedArtifact {
    pub fn kind(&self) -> ModelKind {
        self.metadata.kind
    }

    /// Re-run the holdout probe and compare with the recorded prediction
    pub fn verify_probe(&self) -> Result<(), ArtifactError> {
        let probe = &self.metadata.holdout_probe;
        let reproduced = self.pipeline.predict_one(&probe.features)?;
        let tolerance = 1e-9 * probe.prediction.abs().max(1.0);
        if (reproduced - probe.prediction).abs() > tolerance {
            return Err(ArtifactError::ProbeMismatch {
                recorded: probe.prediction,
                reproduced,
            });
        }
        Ok(())
    }
}

/// Manifest entry for one artifact file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: ModelKind,
    pub file: String,
    pub version: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
    pub size_bytes: usize,
    pub evaluation: Evaluation,
}

/// Combined metadata record for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub models: Vec<ManifestEntry>,
}

impl ModelManifest {
    pub fn entry(&self, kind: ModelKind) -> Option<&ManifestEntry> {
        self.models.iter().find(|m| m.kind == kind)
    }

    /// Read the manifest from `model_dir`. A missing file is `Ok(None)`.
    pub fn load(model_dir: &Path) -> Result<Option<Self>, ArtifactError> {
        let path = model_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ArtifactError::Parse { path, source })
    }
}

/// Path of a model kind's artifact inside `model_dir`
pub fn artifact_path(model_dir: &Path, kind: ModelKind) -> PathBuf {
    model_dir.join(kind.artifact_file())
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Write through a temp file and rename so readers never see partial files
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TrainingError> {
    let write_err = |source| TrainingError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).map_err(write_err)?;
    file.write_all(bytes).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    fs::rename(&temp_path, path).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compute_checksum() {
        let checksum = compute_checksum(b"forest weights");
        assert_eq!(checksum.len(), 64);
        assert_eq!(checksum, compute_checksum(b"forest weights"));
        assert_ne!(checksum, compute_checksum(b"other weights"));
    }

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("model.json");
        write_atomic(&path, b"{}").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_missing_manifest_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ModelManifest::load(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_manifest_is_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(MANIFEST_FILE), "not json").unwrap();
        assert!(matches!(
            ModelManifest::load(temp_dir.path()),
            Err(ArtifactError::Parse { .. })
        ));
    }
}
