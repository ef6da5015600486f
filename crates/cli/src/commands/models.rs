//! Model status command

use anyhow::Result;
use herd_lib::{ModelKind, ModelState};
use std::path::Path;
use tabled::Tabled;

use super::load_registry;
use crate::output::{color_score, color_state, print_info, print_json, print_table, print_warning, OutputFormat};

/// Row for models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Trained")]
    trained_at: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Note")]
    reason: String,
}

/// Show which models a registry over `model_dir` would serve
pub fn show_models(model_dir: &Path, format: OutputFormat) -> Result<()> {
    let registry = load_registry(model_dir);
    let statuses = registry.statuses();

    match format {
        OutputFormat::Json => print_json(&statuses)?,
        OutputFormat::Table => {
            let rows: Vec<ModelRow> = statuses
                .iter()
                .map(|s| ModelRow {
                    kind: s.kind.to_string(),
                    state: color_state(s.state),
                    version: s.version.clone().unwrap_or_else(|| "-".to_string()),
                    trained_at: s
                        .trained_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    score: s
                        .evaluation
                        .as_ref()
                        .map(|e| color_score(e.value))
                        .unwrap_or_else(|| "-".to_string()),
                    reason: s.reason.clone().unwrap_or_default(),
                })
                .collect();
            print_table(rows);

            if ModelKind::ALL
                .iter()
                .all(|k| registry.state(*k) == ModelState::Loaded)
            {
                print_info(&format!("Serving trained models from {}", model_dir.display()));
            } else {
                print_warning("Some predictions will use the heuristic fallback");
            }
        }
    }

    Ok(())
}
