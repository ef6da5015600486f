//! Herd Agent - dairy herd prediction service
//!
//! Loads the trained models once at startup and serves yield and mastitis
//! predictions over HTTP, falling back to the heuristics for any model that
//! is missing or unusable.

use anyhow::Result;
use herd_agent::{api, config::ServiceConfig};
use herd_lib::{
    engine::Engine, health::HealthRegistry, observability::StructuredLogger,
    registry::ModelRegistry, ModelKind,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServiceConfig::load()?;
    let logger = StructuredLogger::new(&config.node_name);
    logger.log_startup(SERVICE_VERSION, &config.model_dir.display().to_string());

    let registry = ModelRegistry::load(config.engine_config());
    for status in registry.statuses() {
        logger.log_model_state(status.kind, status.state, status.version.as_deref());
    }

    let health_registry = HealthRegistry::new();
    health_registry.record_models(&registry).await;

    let engine = Engine::new(registry);
    info!(
        yield_trained = engine.registry().is_available(ModelKind::Yield),
        disease_trained = engine.registry().is_available(ModelKind::Disease),
        "Engine ready"
    );

    let app_state = Arc::new(api::AppState::new(engine, health_registry.clone(), logger.clone()));
    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Ok(())) => info!("API server exited"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
            logger.log_shutdown("API server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
