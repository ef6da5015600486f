//! CLI subcommands

pub mod models;
pub mod predict;
pub mod train;

use herd_lib::{EngineConfig, ModelRegistry};
use std::path::Path;

/// Load the registry once for a single command invocation
pub(crate) fn load_registry(model_dir: &Path) -> ModelRegistry {
    ModelRegistry::load(EngineConfig::with_model_dir(model_dir))
}
