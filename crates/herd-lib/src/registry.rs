//! Model registry for trained artifacts
//!
//! Owns the trained pipelines for the process lifetime:
//! - one load attempt per model kind at startup, no retry or hot reload
//! - checksum and holdout-probe validation before a model is accepted
//! - silent fallback to the heuristic path on any load failure

use crate::artifact::{artifact_path, compute_checksum, Evaluation, ModelManifest, TrainedArtifact};
use crate::config::EngineConfig;
use crate::error::ArtifactError;
use crate::models::ModelKind;
use crate::predictor::{RiskModel, YieldModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Lifecycle state of one model kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Unloaded,
    Loaded,
    FallbackOnly,
}

#[derive(Debug)]
enum Slot {
    Unloaded,
    Loaded(Box<TrainedArtifact>),
    FallbackOnly { reason: String },
}

impl Slot {
    fn state(&self) -> ModelState {
        match self {
            Slot::Unloaded => ModelState::Unloaded,
            Slot::Loaded(_) => ModelState::Loaded,
            Slot::FallbackOnly { .. } => ModelState::FallbackOnly,
        }
    }

    fn artifact(&self) -> Option<&TrainedArtifact> {
        match self {
            Slot::Loaded(artifact) => Some(artifact.as_ref()),
            _ => None,
        }
    }
}

/// Status report for one model kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub kind: ModelKind,
    pub state: ModelState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Registry of trained models, read-only once initialized
#[derive(Debug)]
pub struct ModelRegistry {
    config: EngineConfig,
    yield_slot: Slot,
    disease_slot: Slot,
    initialized: bool,
}

impl ModelRegistry {
    /// Create a registry with both kinds unloaded
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            yield_slot: Slot::Unloaded,
            disease_slot: Slot::Unloaded,
            initialized: false,
        }
    }

    /// Create a registry and attempt the one-time load
    pub fn load(config: EngineConfig) -> Self {
        let mut registry = Self::new(config);
        registry.initialize();
        registry
    }

    /// Registry with no trained models; every call uses the heuristics
    pub fn fallback_only() -> Self {
        Self {
            config: EngineConfig::default(),
            yield_slot: Slot::FallbackOnly {
                reason: "trained models disabled".to_string(),
            },
            disease_slot: Slot::FallbackOnly {
                reason: "trained models disabled".to_string(),
            },
            initialized: true,
        }
    }

    /// Attempt to load each artifact. Only the first call has any effect.
    pub fn initialize(&mut self) {
        if self.initialized {
            debug!("Model registry already initialized, ignoring");
            return;
        }
        self.initialized = true;

        let model_dir = self.config.model_dir.clone();
        let manifest = match ModelManifest::load(&model_dir) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable model manifest, checksums not verified");
                None
            }
        };

        for kind in ModelKind::ALL {
            let slot = match load_artifact(&model_dir, kind, manifest.as_ref()) {
                Ok(artifact) => {
                    info!(
                        event = "model_loaded",
                        kind = %kind,
                        version = %artifact.metadata.version,
                        trained_at = %artifact.metadata.trained_at,
                        "Loaded trained model"
                    );
                    Slot::Loaded(Box::new(artifact))
                }
                Err(ArtifactError::NotFound(path)) => {
                    info!(
                        event = "model_fallback",
                        kind = %kind,
                        path = %path.display(),
                        "No trained model found, using heuristic"
                    );
                    Slot::FallbackOnly {
                        reason: format!("artifact not found: {}", path.display()),
                    }
                }
                Err(e) => {
                    warn!(
                        event = "model_fallback",
                        kind = %kind,
                        error = %e,
                        "Failed to load trained model, using heuristic"
                    );
                    Slot::FallbackOnly {
                        reason: e.to_string(),
                    }
                }
            };
            *self.slot_mut(kind) = slot;
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self, kind: ModelKind) -> ModelState {
        self.slot(kind).state()
    }

    /// Whether a trained model serves `kind`
    pub fn is_available(&self, kind: ModelKind) -> bool {
        self.state(kind) == ModelState::Loaded
    }

    pub fn yield_model(&self) -> YieldModel<'_> {
        match self.yield_slot.artifact() {
            Some(artifact) => YieldModel::Trained(artifact),
            None => YieldModel::Fallback,
        }
    }

    pub fn risk_model(&self) -> RiskModel<'_> {
        match self.disease_slot.artifact() {
            Some(artifact) => RiskModel::Trained(artifact),
            None => RiskModel::Fallback,
        }
    }

    pub fn status(&self, kind: ModelKind) -> ModelStatus {
        let slot = self.slot(kind);
        let metadata = slot.artifact().map(|a| &a.metadata);
        ModelStatus {
            kind,
            state: slot.state(),
            version: metadata.map(|m| m.version.clone()),
            trained_at: metadata.map(|m| m.trained_at),
            evaluation: metadata.map(|m| m.evaluation.clone()),
            reason: match slot {
                Slot::FallbackOnly { reason } => Some(reason.clone()),
                _ => None,
            },
        }
    }

    pub fn statuses(&self) -> Vec<ModelStatus> {
        ModelKind::ALL.iter().map(|k| self.status(*k)).collect()
    }

    fn slot(&self, kind: ModelKind) -> &Slot {
        match kind {
            ModelKind::Yield => &self.yield_slot,
            ModelKind::Disease => &self.disease_slot,
        }
    }

    fn slot_mut(&mut self, kind: ModelKind) -> &mut Slot {
        match kind {
            ModelKind::Yield => &mut self.yield_slot,
            ModelKind::Disease => &mut self.disease_slot,
        }
    }
}

/// Read, verify and deserialize one artifact
fn load_artifact(
    model_dir: &Path,
    kind: ModelKind,
    manifest: Option<&ModelManifest>,
) -> Result<TrainedArtifact, ArtifactError> {
    let path = artifact_path(model_dir, kind);
    if !path.exists() {
        return Err(ArtifactError::NotFound(path));
    }

    let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;

    if let Some(entry) = manifest.and_then(|m| m.entry(kind)) {
        let actual = compute_checksum(&bytes);
        if actual != entry.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: entry.checksum.clone(),
                actual,
            });
        }
        debug!(kind = %kind, checksum = %actual, "Artifact checksum validated");
    }

    let artifact: TrainedArtifact = serde_json::from_slice(&bytes).map_err(|source| {
        ArtifactError::Parse {
            path: path.clone(),
            source,
        }
    })?;

    if artifact.kind() != kind {
        return Err(ArtifactError::KindMismatch {
            expected: kind,
            found: artifact.kind(),
        });
    }

    artifact.verify_probe()?;
    Ok(artifact)
}
