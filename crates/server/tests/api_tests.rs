//! Integration tests for the prediction API endpoints

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pitwall_lib::{
    advise_or_fallback, ArtifactStore, HeuristicAdvisor, LapTimePredictor, PipelineMetrics,
    PitwallError, PredictionInput, SessionArchiveSource, StrategyAdvisor, StrategyContext,
    TrainingPipeline,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct AppState {
    pub trainer: TrainingPipeline,
    pub predictor: LapTimePredictor,
    pub advisor: Arc<dyn StrategyAdvisor>,
    pub store: Arc<ArtifactStore>,
    pub metrics: PipelineMetrics,
}

fn error_status(err: &PitwallError) -> StatusCode {
    match err {
        PitwallError::DataUnavailable { .. } | PitwallError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
        PitwallError::ModelUnavailable(_) | PitwallError::SchemaUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.store.current().map(|artifact| {
        json!({
            "trained_at": artifact.trained_at,
            "feature_count": artifact.regressor.feature_names().len(),
            "samples": artifact.samples,
        })
    });
    Json(json!({
        "status": "ok",
        "model_loaded": model.is_some(),
        "model": model,
    }))
}

async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

#[derive(serde::Deserialize)]
struct TrainRequest {
    year: u16,
    race: String,
    session: String,
}

async fn train(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrainRequest>,
) -> impl IntoResponse {
    state.metrics.inc_training_runs();
    match state
        .trainer
        .run(request.year, &request.race, &request.session)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionInput>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            let err = PitwallError::InvalidInput(rejection.body_text());
            return (error_status(&err), Json(json!({ "error": err.to_string() })));
        }
    };
    match state.predictor.predict(&input) {
        Ok(value) => (
            StatusCode::OK,
            Json(json!({ "predicted_lap_time_seconds": value })),
        ),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn strategy(
    State(state): State<Arc<AppState>>,
    Json(context): Json<StrategyContext>,
) -> impl IntoResponse {
    if !(0.0..=1.0).contains(&context.race_progress) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "race_progress must be within [0, 1]" })),
        );
    }
    let advice = advise_or_fallback(state.advisor.as_ref(), &context).await;
    (StatusCode::OK, Json(json!(advice)))
}

fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/train", post(train))
        .route("/api/predict", post(predict))
        .route("/api/strategy", post(strategy))
        .with_state(state)
}

/// Write a small columnar session archive the training endpoint can
/// consume: 2023 Monza race, one driver, twelve laps.
fn write_session_archive(data_dir: &std::path::Path) {
    let laps = 12;
    let mut rows = Vec::new();
    for i in 0..laps {
        rows.push(json!([
            "VER",
            1,
            i + 1,
            "MEDIUM",
            i + 1,
            90.0 + 0.1 * i as f64,
            "Red Bull Racing",
            "1",
            i == 0,
            24.0,
            38.0,
            50.0,
            2.0
        ]));
    }
    let archive = json!({
        "columns": [
            "Driver", "Stint", "LapNumber", "Compound", "TyreLife",
            "LapTimeSeconds", "Team", "TrackStatus", "FreshTyre",
            "AirTemp", "TrackTemp", "Humidity", "WindSpeed"
        ],
        "rows": rows,
    });
    std::fs::write(
        data_dir.join("2023_monza_race.json"),
        serde_json::to_vec(&archive).unwrap(),
    )
    .unwrap();
}

fn setup_test_app() -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().unwrap();
    write_session_archive(dir.path());

    let store = Arc::new(ArtifactStore::new(dir.path().join("model.json")));
    let source = Arc::new(SessionArchiveSource::new(dir.path()));
    let state = Arc::new(AppState {
        trainer: TrainingPipeline::new(source, store.clone()),
        predictor: LapTimePredictor::new(store.clone()),
        advisor: Arc::new(HeuristicAdvisor),
        store,
        metrics: PipelineMetrics::new(),
    });
    let router = create_test_router(state.clone());
    (router, state, dir)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn prediction_request() -> serde_json::Value {
    json!({
        "compound": "soft",
        "stint": 2,
        "lap_number": 20,
        "tyre_life": 5,
        "track_status": 1.0,
        "air_temp": 24.0,
        "track_temp": 39.0,
        "humidity": 48.0,
        "wind_speed": 2.5,
        "fresh_tyre": false,
        "team": "Ferrari",
        "driver": "LEC"
    })
}

#[tokio::test]
async fn test_predict_without_model_returns_503() {
    let (app, _state, _dir) = setup_test_app();

    let response = app
        .oneshot(post_json("/api/predict", prediction_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("train"));
}

#[tokio::test]
async fn test_train_then_predict_round_trip() {
    let (app, _state, _dir) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/train",
            json!({ "year": 2023, "race": "Monza", "session": "Race" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["samples"], 12);
    assert!(outcome["feature_count"].as_u64().unwrap() > 12);

    let response = app
        .oneshot(post_json("/api/predict", prediction_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let predicted = body["predicted_lap_time_seconds"].as_f64().unwrap();
    assert!(predicted.is_finite());
}

#[tokio::test]
async fn test_predict_with_malformed_record_returns_400_json_error() {
    let (app, _state, _dir) = setup_test_app();

    let mut record = prediction_request();
    record["tyre_life"] = json!("five");

    let response = app
        .oneshot(post_json("/api/predict", record))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid input"));
}

#[tokio::test]
async fn test_train_unknown_session_returns_400() {
    let (app, _state, _dir) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/train",
            json!({ "year": 1990, "race": "Nowhere", "session": "Race" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_strategy_rejects_out_of_range_progress() {
    let (app, _state, _dir) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/strategy",
            json!({
                "current_lap_data": { "tyre_life": 8.0 },
                "stint_history": [],
                "race_progress": 1.7
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_strategy_returns_structured_advice() {
    let (app, _state, _dir) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/strategy",
            json!({
                "current_lap_data": { "tyre_life": 25.0, "compound": "SOFT" },
                "stint_history": [],
                "race_progress": 0.4
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let advice = body_json(response).await;
    assert_eq!(advice["recommendation"], "Pit within 2 laps");
    assert!(advice["reasoning"].is_string());
    assert!(advice["confidence"].is_string());
}

#[tokio::test]
async fn test_healthz_reports_model_state() {
    let (app, _state, _dir) = setup_test_app();

    let response = app
        .clone()
        .oneshot(get_req("/healthz"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["model_loaded"], false);

    app.clone()
        .oneshot(post_json(
            "/api/train",
            json!({ "year": 2023, "race": "Monza", "session": "Race" }),
        ))
        .await
        .unwrap();

    let health = body_json(app.oneshot(get_req("/healthz")).await.unwrap()).await;
    assert_eq!(health["model_loaded"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, state, _dir) = setup_test_app();

    state.metrics.observe_prediction_latency(0.002);
    state.metrics.inc_predictions();

    let response = app.oneshot(get_req("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("pitwall_prediction_latency_seconds"));
    assert!(metrics_text.contains("pitwall_predictions_total"));
}
