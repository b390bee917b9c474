//! Pitwall server - race lap-time prediction service
//!
//! Serves lap-time predictions and pit-strategy advice over HTTP,
//! training models on demand from archived session telemetry.

use anyhow::{Context, Result};
use pitwall_lib::{
    ArtifactStore, HeuristicAdvisor, LapTimePredictor, PipelineMetrics, SessionArchiveSource,
    TrainingPipeline,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting pitwall server");

    // Load configuration
    let config = config::ServerConfig::load()?;
    info!(
        model_path = %config.model_path,
        data_dir = %config.data_dir,
        "Server configured"
    );

    let store = Arc::new(ArtifactStore::new(&config.model_path));
    let source = Arc::new(SessionArchiveSource::new(&config.data_dir));
    let metrics = PipelineMetrics::new();

    // A previously trained artifact is served immediately; a fresh
    // deployment starts without one and trains on request.
    match store.get_or_load() {
        Ok(artifact) => {
            metrics.set_model_info(
                artifact.regressor.feature_names().len(),
                artifact.samples,
                0.0,
            );
            info!(
                year = artifact.session.year,
                race = %artifact.session.race,
                "Loaded existing model artifact"
            );
        }
        Err(e) => warn!(error = %e, "No model artifact loaded at startup"),
    }

    let app_state = Arc::new(api::AppState {
        trainer: TrainingPipeline::new(source, store.clone()),
        predictor: LapTimePredictor::new(store.clone()),
        advisor: Arc::new(HeuristicAdvisor),
        store,
        metrics,
    });

    // Start the API server
    let api_handle = tokio::spawn(api::serve(config.port, app_state));

    // Run until the server fails (bind error, fatal I/O) or a shutdown
    // signal arrives, whichever comes first.
    tokio::select! {
        result = api_handle => {
            result.context("API server task panicked")??;
            anyhow::bail!("API server exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
