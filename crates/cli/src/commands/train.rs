//! Model training command

use anyhow::{Context, Result};
use herd_lib::artifact::Metric;
use herd_lib::observability::StructuredLogger;
use herd_lib::{Trainer, TrainerConfig, TrainingReport};
use std::path::Path;
use tabled::Tabled;

use crate::output::{color_score, format_bytes, print_json, print_success, print_table, OutputFormat};

/// Row for the training report table
#[derive(Tabled)]
struct EvaluationRow {
    #[tabled(rename = "Model")]
    kind: String,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Score")]
    value: String,
    #[tabled(rename = "ROC-AUC")]
    roc_auc: String,
    #[tabled(rename = "Train/Test")]
    rows: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Checksum")]
    checksum: String,
}

/// Train both models and write them to `model_dir`
pub fn run(yield_data: &Path, disease_data: &Path, model_dir: &Path, format: OutputFormat) -> Result<()> {
    let trainer = Trainer::new(TrainerConfig::with_model_dir(model_dir));
    let report = trainer
        .train(yield_data, disease_data)
        .context("Training failed")?;

    let logger = StructuredLogger::new("herd-cli");
    for entry in &report.manifest.models {
        let evaluation = &entry.evaluation;
        logger.log_training(
            entry.kind,
            metric_name(evaluation.metric),
            evaluation.value,
            evaluation.train_rows + evaluation.test_rows,
        );
    }

    match format {
        OutputFormat::Json => print_json(&report.manifest)?,
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn metric_name(metric: Metric) -> &'static str {
    match metric {
        Metric::R2 => "r2",
        Metric::Accuracy => "accuracy",
    }
}

fn print_report(report: &TrainingReport) {
    let rows: Vec<EvaluationRow> = report
        .manifest
        .models
        .iter()
        .map(|entry| EvaluationRow {
            kind: entry.kind.to_string(),
            metric: metric_name(entry.evaluation.metric).to_string(),
            value: color_score(entry.evaluation.value),
            roc_auc: entry
                .evaluation
                .roc_auc
                .map(|auc| format!("{:.3}", auc))
                .unwrap_or_else(|| "-".to_string()),
            rows: format!("{}/{}", entry.evaluation.train_rows, entry.evaluation.test_rows),
            size: format_bytes(entry.size_bytes),
            checksum: entry.checksum.chars().take(12).collect(),
        })
        .collect();

    print_table(rows);
    print_success(&format!(
        "Models written to {}",
        report.model_dir.display()
    ));
}
