//! Service configuration

use anyhow::Result;
use herd_lib::EngineConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration, read from `HERD_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name reported in structured logs
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// HTTP port for predictions, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding trained artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_node_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_model_dir() -> PathBuf {
    EngineConfig::default().model_dir
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            api_port: default_api_port(),
            model_dir: default_model_dir(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("HERD"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::with_model_dir(&self.model_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.engine_config().model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ServiceConfig =
            serde_json::from_value(serde_json::json!({"api_port": 9000})).unwrap();
        assert_eq!(config.api_port, 9000);
        assert_eq!(config.model_dir, PathBuf::from("models"));
    }
}
