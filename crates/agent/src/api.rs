//! HTTP API for predictions, model status, health checks and metrics

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use herd_lib::{
    engine::{Engine, EngineResponse},
    health::{ComponentStatus, HealthRegistry},
    observability::StructuredLogger,
    registry::ModelStatus,
    RiskResult,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
pub struct AppState {
    pub engine: Engine,
    pub health_registry: HealthRegistry,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(engine: Engine, health_registry: HealthRegistry, logger: StructuredLogger) -> Self {
        Self {
            engine,
            health_registry,
            logger,
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: Vec<ModelStatus>,
}

/// Parse a JSON body; anything that is not JSON is a 400
fn parse_body(body: &Bytes) -> Result<Value, Response> {
    serde_json::from_slice(body).map_err(|e| {
        let response: EngineResponse<Value> =
            EngineResponse::failure(format!("request body is not valid JSON: {}", e));
        (StatusCode::BAD_REQUEST, Json(response)).into_response()
    })
}

async fn predict_yield(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    Json(state.engine.handle_yield(&value)).into_response()
}

async fn predict_disease(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let response = state.engine.handle_disease(&value);
    if let Some(RiskResult {
        risk_level,
        probability,
        ..
    }) = &response.result
    {
        let cow_id = value.get("cow_id").and_then(Value::as_str).unwrap_or("unknown");
        let path = state.engine.registry().risk_model().path();
        state
            .logger
            .log_risk_assessment(cow_id, risk_level.as_str(), *probability, path);
    }
    Json(response).into_response()
}

async fn models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ModelsResponse {
        models: state.engine.registry().statuses(),
    })
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        // heuristic fallback still answers every request
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict/yield", post(predict_yield))
        .route("/predict/disease", post(predict_disease))
        .route("/models", get(models))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
