//! Offline training of the yield and mastitis forests
//!
//! Each run reads both historical tables, fits one pipeline per model kind,
//! evaluates it on a seeded holdout split and writes the artifacts plus a
//! combined manifest into the model directory. Nothing is written unless
//! both models fit.

mod dataset;
mod metrics;

pub use dataset::{load_disease, load_yield, Dataset};
pub use metrics::{accuracy, r2_score, roc_auc, CLASSIFICATION_THRESHOLD};

use crate::artifact::{
    artifact_path, compute_checksum, write_atomic, ArtifactMetadata, Evaluation, HoldoutProbe,
    ManifestEntry, Metric, ModelManifest, TrainedArtifact, ARTIFACT_VERSION, MANIFEST_FILE,
};
use crate::error::{PipelineError, TrainingError};
use crate::models::ModelKind;
use crate::predictor::{clip_outliers_iqr, ForestParams, ForestPipeline, DEFAULT_SEED, DISEASE_FEATURES, YIELD_FEATURES};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Share of rows held out for evaluation
pub const TEST_FRACTION: f64 = 0.2;

/// Smallest table that still leaves four training rows and one test row
pub const MIN_TRAINING_ROWS: usize = 5;

/// Trainer settings
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub model_dir: PathBuf,
    pub test_fraction: f64,
    pub split_seed: u64,
    pub forest: ForestParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            test_fraction: TEST_FRACTION,
            split_seed: DEFAULT_SEED,
            forest: ForestParams::default(),
        }
    }
}

impl TrainerConfig {
    pub fn with_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a successful training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model_dir: PathBuf,
    pub manifest: ModelManifest,
}

impl TrainingReport {
    pub fn evaluation(&self, kind: ModelKind) -> Option<&Evaluation> {
        self.manifest.entry(kind).map(|e| &e.evaluation)
    }
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train both models from their CSV tables and persist them
    pub fn train(&self, yield_csv: &Path, disease_csv: &Path) -> Result<TrainingReport, TrainingError> {
        let trained_at = Utc::now();

        let yield_data = load_yield(yield_csv)?;
        info!(kind = %ModelKind::Yield, rows = yield_data.len(), path = %yield_csv.display(), "Loaded training data");
        let yield_artifact = self.fit_yield(yield_data, trained_at)?;

        let disease_data = load_disease(disease_csv)?;
        info!(kind = %ModelKind::Disease, rows = disease_data.len(), path = %disease_csv.display(), "Loaded training data");
        let disease_artifact = self.fit_disease(disease_data, trained_at)?;

        let models = [&yield_artifact, &disease_artifact]
            .into_iter()
            .map(|artifact| self.persist(artifact))
            .collect::<Result<Vec<_>, _>>()?;

        let manifest = ModelManifest {
            version: ARTIFACT_VERSION.to_string(),
            trained_at,
            models,
        };
        let manifest_path = self.config.model_dir.join(MANIFEST_FILE);
        write_atomic(&manifest_path, &serde_json::to_vec_pretty(&manifest)?)?;
        info!(path = %manifest_path.display(), "Wrote model manifest");

        Ok(TrainingReport {
            model_dir: self.config.model_dir.clone(),
            manifest,
        })
    }

    /// Clip outliers, fit and evaluate the yield regressor
    pub fn fit_yield(&self, mut data: Dataset, trained_at: DateTime<Utc>) -> Result<TrainedArtifact, TrainingError> {
        clip_outliers_iqr(&mut data.rows);
        self.fit(ModelKind::Yield, &YIELD_FEATURES, &data, trained_at)
    }

    /// Fit and evaluate the mastitis probability model
    pub fn fit_disease(&self, data: Dataset, trained_at: DateTime<Utc>) -> Result<TrainedArtifact, TrainingError> {
        self.fit(ModelKind::Disease, &DISEASE_FEATURES, &data, trained_at)
    }

    fn fit(
        &self,
        kind: ModelKind,
        feature_names: &[&str],
        data: &Dataset,
        trained_at: DateTime<Utc>,
    ) -> Result<TrainedArtifact, TrainingError> {
        if data.len() < MIN_TRAINING_ROWS {
            return Err(TrainingError::InsufficientData {
                required: MIN_TRAINING_ROWS,
                actual: data.len(),
            });
        }

        let (train_idx, test_idx) =
            split_indices(data.len(), self.config.test_fraction, self.config.split_seed);
        let (train_x, train_y) = select(data, &train_idx);
        let (test_x, test_y) = select(data, &test_idx);
        debug!(kind = %kind, train_rows = train_x.len(), test_rows = test_x.len(), "Split dataset");

        let pipeline = ForestPipeline::fit(feature_names, &train_x, &train_y, self.config.forest)?;
        let predictions = pipeline.predict(&test_x)?;

        let evaluation = match kind {
            ModelKind::Yield => Evaluation {
                metric: Metric::R2,
                value: r2_score(&test_y, &predictions),
                roc_auc: None,
                train_rows: train_x.len(),
                test_rows: test_x.len(),
            },
            ModelKind::Disease => Evaluation {
                metric: Metric::Accuracy,
                value: accuracy(&test_y, &predictions),
                roc_auc: roc_auc(&test_y, &predictions),
                train_rows: train_x.len(),
                test_rows: test_x.len(),
            },
        };

        let (features, prediction) = test_x
            .first()
            .zip(predictions.first())
            .ok_or(PipelineError::Empty)?;
        let holdout_probe = HoldoutProbe {
            features: features.clone(),
            prediction: *prediction,
        };

        info!(
            kind = %kind,
            metric = ?evaluation.metric,
            value = evaluation.value,
            roc_auc = ?evaluation.roc_auc,
            "Model evaluated"
        );

        Ok(TrainedArtifact {
            metadata: ArtifactMetadata {
                kind,
                version: ARTIFACT_VERSION.to_string(),
                trained_at,
                evaluation,
                holdout_probe,
            },
            pipeline,
        })
    }

    fn persist(&self, artifact: &TrainedArtifact) -> Result<ManifestEntry, TrainingError> {
        let kind = artifact.kind();
        let path = artifact_path(&self.config.model_dir, kind);
        let bytes = serde_json::to_vec(artifact)?;
        write_atomic(&path, &bytes)?;

        let checksum = compute_checksum(&bytes);
        info!(
            event = "artifact_written",
            kind = %kind,
            path = %path.display(),
            checksum = %checksum,
            size_bytes = bytes.len(),
            "Saved trained model"
        );

        Ok(ManifestEntry {
            kind,
            file: kind.artifact_file().to_string(),
            version: artifact.metadata.version.clone(),
            trained_at: artifact.metadata.trained_at,
            checksum,
            size_bytes: bytes.len(),
            evaluation: artifact.metadata.evaluation.clone(),
        })
    }
}

/// Seeded shuffle split into (train, test) row indices
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

fn select(data: &Dataset, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    indices
        .iter()
        .map(|&i| (data.rows[i].clone(), data.targets[i]))
        .unzip()
}
