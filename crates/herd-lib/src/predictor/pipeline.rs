//! Standardization + random forest pipeline
//!
//! The fitted pipeline is what a trained artifact carries. It is fitted by
//! the trainer and deserialized by the model registry; both go through the
//! same `predict` so evaluation and serving see identical numbers.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Number of trees in each forest
pub const DEFAULT_N_TREES: usize = 100;

/// Seed shared by the forest bootstrap and the train/test split
pub const DEFAULT_SEED: u64 = 42;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Forest hyperparameters
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            seed: DEFAULT_SEED,
        }
    }
}

/// Per-column zero-mean, unit-variance scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    /// Fit on rows of equal width. Constant columns get a scale of 1.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, PipelineError> {
        let width = rows.first().map(|r| r.len()).ok_or(PipelineError::Empty)?;
        let n = rows.len() as f64;
        let mut means = vec![0.0; width];
        let mut scales = vec![0.0; width];

        for col in 0..width {
            let mean = rows.iter().map(|r| r[col]).sum::<f64>() / n;
            let var = rows.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            means[col] = mean;
            scales[col] = if std > f64::EPSILON { std } else { 1.0 };
        }

        Ok(Self { means, scales })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (mean, scale))| (v - mean) / scale)
            .collect()
    }
}

/// Fitted standardizer followed by a random forest
#[derive(Debug, Serialize, Deserialize)]
pub struct ForestPipeline {
    feature_names: Vec<String>,
    scaler: Standardizer,
    forest: Forest,
}

impl ForestPipeline {
    pub fn fit(
        feature_names: &[&str],
        rows: &[Vec<f64>],
        targets: &[f64],
        params: ForestParams,
    ) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::Empty);
        }
        if rows.len() != targets.len() {
            return Err(PipelineError::Length {
                rows: rows.len(),
                targets: targets.len(),
            });
        }
        check_width(rows, feature_names.len())?;

        let scaler = Standardizer::fit(rows)?;
        let x = to_matrix(&scaler, rows)?;
        let y: Vec<f64> = targets.to_vec();
        let forest = Forest::fit(
            &x,
            &y,
            RandomForestRegressorParameters::default()
                .with_n_trees(params.n_trees)
                .with_seed(params.seed),
        )?;

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            scaler,
            forest,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::Empty);
        }
        check_width(rows, self.scaler.width())?;
        let x = to_matrix(&self.scaler, rows)?;
        Ok(self.forest.predict(&x)?)
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, PipelineError> {
        self.predict(&[row.to_vec()])?
            .into_iter()
            .next()
            .ok_or(PipelineError::Empty)
    }
}

fn check_width(rows: &[Vec<f64>], expected: usize) -> Result<(), PipelineError> {
    match rows.iter().find(|r| r.len() != expected) {
        Some(bad) => Err(PipelineError::Width {
            expected,
            actual: bad.len(),
        }),
        None => Ok(()),
    }
}

fn to_matrix(scaler: &Standardizer, rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, PipelineError> {
    let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform(r)).collect();
    Ok(DenseMatrix::from_2d_vec(&scaled)?)
}
