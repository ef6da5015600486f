//! Integration tests for the prediction service API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use herd_agent::api::{create_router, AppState};
use herd_lib::{
    engine::Engine,
    health::{components, HealthRegistry},
    observability::StructuredLogger,
    registry::ModelRegistry,
    EngineConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_test_app() -> (Router, Arc<AppState>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let registry = ModelRegistry::load(EngineConfig::with_model_dir(temp_dir.path()));

    let health_registry = HealthRegistry::new();
    health_registry.record_models(&registry).await;

    let state = Arc::new(AppState::new(
        Engine::new(registry),
        health_registry,
        StructuredLogger::new("test-node"),
    ));
    let router = create_router(state.clone());

    (router, state, temp_dir)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_predict_yield_fallback() {
    let (app, _state, _dir) = setup_test_app().await;

    let body = json!({
        "feed_kg": 12.0,
        "temperature_c": 25.0,
        "humidity_pct": 60.0,
        "milking_time_min": 15.0
    });
    let response = app
        .oneshot(post_json("/predict/yield", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], true);
    assert_eq!(result["predicted_liters"], 27.56);
    assert!(result["confidence_label"].as_str().unwrap().contains("heuristic"));
}

#[tokio::test]
async fn test_predict_yield_invalid_field_is_failure_result() {
    let (app, _state, _dir) = setup_test_app().await;

    let body = json!({
        "feed_kg": "lots",
        "temperature_c": 25.0,
        "humidity_pct": 60.0,
        "milking_time_min": 15.0
    });
    let response = app
        .oneshot(post_json("/predict/yield", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().contains("feed_kg"));
    assert!(result.get("predicted_liters").is_none());
}

#[tokio::test]
async fn test_non_json_body_is_bad_request() {
    let (app, _state, _dir) = setup_test_app().await;

    let response = app
        .oneshot(post_json("/predict/disease", "not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
}

#[tokio::test]
async fn test_predict_disease_high_risk() {
    let (app, _state, _dir) = setup_test_app().await;

    let body = json!({
        "cow_id": "COW007",
        "day": 12,
        "months_after_birth": 1,
        "previous_mastitis": true,
        "temperature_c": 40.0,
        "breed": "Holstein",
        "front_left_internal": 0.9,
        "front_left_external": 0.5,
        "front_right_internal": 0.5,
        "front_right_external": 0.5,
        "rear_left_internal": 0.5,
        "rear_left_external": 0.5,
        "rear_right_internal": 0.5,
        "rear_right_external": 0.5
    });
    let response = app
        .oneshot(post_json("/predict/disease", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], true);
    assert_eq!(result["risk_level"], "high");
    assert_eq!(result["probability"], 0.95);
    assert_eq!(result["recommendations"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_predict_disease_missing_sensor() {
    let (app, _state, _dir) = setup_test_app().await;

    let body = json!({
        "cow_id": "COW007",
        "day": 12,
        "months_after_birth": 1,
        "previous_mastitis": false,
        "temperature_c": 38.0,
        "breed": "Holstein"
    });
    let response = app
        .oneshot(post_json("/predict/disease", body.to_string()))
        .await
        .unwrap();

    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().is_some());
}

#[tokio::test]
async fn test_models_reports_fallback() {
    let (app, _state, _dir) = setup_test_app().await;

    let response = app.oneshot(get("/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 2);
    for model in models {
        assert_eq!(model["state"], "fallback_only");
        assert!(model["reason"].as_str().unwrap().contains("not found"));
    }
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let (app, _state, _dir) = setup_test_app().await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(
        health["components"][components::YIELD_MODEL]["status"],
        "degraded"
    );
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state, _dir) = setup_test_app().await;

    state
        .health_registry
        .set_unhealthy(components::DISEASE_MODEL, "Failed")
        .await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readyz_before_and_after_ready() {
    let (app, state, _dir) = setup_test_app().await;

    let response = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let readiness = body_json(response).await;
    assert_eq!(readiness["ready"], false);

    state.health_registry.set_ready(true).await;
    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state, _dir) = setup_test_app().await;

    let body = json!({
        "feed_kg": 10.0,
        "temperature_c": 20.0,
        "humidity_pct": 50.0,
        "milking_time_min": 10.0
    });
    app.clone()
        .oneshot(post_json("/predict/yield", body.to_string()))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("herd_predictions_total"));
    assert!(text.contains("herd_model_loaded"));
}
