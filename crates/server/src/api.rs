//! HTTP API for training, prediction and strategy advice

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pitwall_lib::{
    advise_or_fallback, ArtifactStore, LapTimePredictor, PipelineMetrics, PitwallError,
    PredictionInput, StrategyAdvisor, StrategyContext, TrainingOutcome, TrainingPipeline,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub trainer: TrainingPipeline,
    pub predictor: LapTimePredictor,
    pub advisor: Arc<dyn StrategyAdvisor>,
    pub store: Arc<ArtifactStore>,
    pub metrics: PipelineMetrics,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// One JSON error shape for every failure path.
fn error_response(err: &PitwallError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        PitwallError::DataUnavailable { .. } | PitwallError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
        PitwallError::ModelUnavailable(_) | PitwallError::SchemaUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// A request body the extractor could not turn into the target type is
/// the invalid-input condition, with the same error body as every other
/// failure.
fn invalid_input(rejection: JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
    error_response(&PitwallError::InvalidInput(rejection.body_text()))
}

/// Service banner with the available endpoints.
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "pitwall",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/healthz", "/metrics", "/api/train", "/api/predict", "/api/strategy"],
    }))
}

/// Liveness plus a description of the currently served model, if any.
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.store.current().map(|artifact| {
        serde_json::json!({
            "trained_at": artifact.trained_at,
            "feature_count": artifact.regressor.feature_names().len(),
            "samples": artifact.samples,
        })
    });
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": model.is_some(),
        "model": model,
    }))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, Vec::new()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub year: u16,
    pub race: String,
    pub session: String,
}

async fn train(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TrainRequest>, JsonRejection>,
) -> Result<Json<TrainingOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(invalid_input)?;
    state.metrics.inc_training_runs();
    let started = Instant::now();

    match state
        .trainer
        .run(request.year, &request.race, &request.session)
        .await
    {
        Ok(outcome) => {
            state
                .metrics
                .observe_training_duration(started.elapsed().as_secs_f64());
            state
                .metrics
                .set_model_info(outcome.feature_count, outcome.samples, outcome.rmse);
            info!(
                year = request.year,
                race = %request.race,
                samples = outcome.samples,
                rmse = outcome.rmse,
                "training request completed"
            );
            Ok(Json(outcome))
        }
        Err(e) => {
            state.metrics.inc_training_failures();
            error!(year = request.year, race = %request.race, error = %e, "training request failed");
            Err(error_response(&e))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_lap_time_seconds: f64,
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(input) = payload.map_err(invalid_input)?;
    let started = Instant::now();
    match state.predictor.predict(&input) {
        Ok(value) => {
            state
                .metrics
                .observe_prediction_latency(started.elapsed().as_secs_f64());
            state.metrics.inc_predictions();
            Ok(Json(PredictResponse {
                predicted_lap_time_seconds: value,
            }))
        }
        Err(e) => {
            state.metrics.inc_prediction_errors();
            Err(error_response(&e))
        }
    }
}

async fn strategy(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StrategyContext>, JsonRejection>,
) -> Result<Json<pitwall_lib::StrategyAdvice>, (StatusCode, Json<ErrorResponse>)> {
    let Json(context) = payload.map_err(invalid_input)?;
    if !(0.0..=1.0).contains(&context.race_progress) {
        let err = PitwallError::InvalidInput(format!(
            "race_progress must be within [0, 1], got {}",
            context.race_progress
        ));
        return Err(error_response(&err));
    }

    // Advisor failures degrade to the fallback triple, never to an error.
    let advice = advise_or_fallback(state.advisor.as_ref(), &context).await;
    Ok(Json(advice))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/train", post(train))
        .route("/api/predict", post(predict))
        .route("/api/strategy", post(strategy))
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
