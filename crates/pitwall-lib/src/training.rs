//! Training orchestrator
//!
//! Runs the full feature pipeline over one session of telemetry, fits the
//! lap-time regressor and publishes the artifact. The ordered feature-name
//! list captured here is the authoritative schema; inference never derives
//! its own.

use crate::artifact::{ArtifactStore, ModelArtifact, SessionKey};
use crate::error::PitwallError;
use crate::frame::{as_f64, coerce_f64, Frame};
use crate::models::TrainingOutcome;
use crate::pipeline::{derive, encode, normalize, team_column_name, COMPOUNDS, TEAMS};
use crate::regressor::LapTimeRegressor;
use crate::source::TelemetrySource;
use ndarray::{Array1, Array2};
use std::sync::Arc;
use tracing::{debug, info};

/// Target column; never part of the feature schema.
pub const TARGET_COLUMN: &str = "lap_time_seconds";

/// Numeric columns eligible as features, in schema order. Identifier
/// columns (driver, lap_number, stint, lap_timestamp) are excluded by
/// never being listed.
const BASE_FEATURES: [&str; 10] = [
    "rolling_avg_lap_time",
    "delta_to_rolling_avg",
    "tyre_life",
    "lap_number_in_stint",
    "track_temp_delta_avg",
    "track_status_numeric",
    "air_temp",
    "humidity_percent",
    "wind_speed",
    "fresh_tyre",
];

pub struct TrainingPipeline {
    source: Arc<dyn TelemetrySource>,
    store: Arc<ArtifactStore>,
}

impl TrainingPipeline {
    pub fn new(source: Arc<dyn TelemetrySource>, store: Arc<ArtifactStore>) -> Self {
        Self { source, store }
    }

    /// Train a model from one session and publish it. Nothing is written
    /// and the served model is untouched unless every stage succeeds.
    pub async fn run(
        &self,
        year: u16,
        race: &str,
        session: &str,
    ) -> Result<TrainingOutcome, PitwallError> {
        info!(year, race, session, "training run started");

        let mut frame = self.source.fetch_session(year, race, session).await?;
        if frame.num_rows() == 0 {
            return Err(data_unavailable(year, race, session));
        }
        debug!(rows = frame.num_rows(), "normalizing raw lap records");

        normalize::normalize(&mut frame);
        encode::encode_categoricals(&mut frame);
        derive::add_derived_features(&mut frame);

        let (feature_names, x, y) = build_training_matrix(&frame)?;
        if x.nrows() == 0 {
            // Every row lacked a usable lap time.
            return Err(data_unavailable(year, race, session));
        }
        info!(
            samples = x.nrows(),
            features = feature_names.len(),
            "fitting lap-time regressor"
        );

        let regressor = LapTimeRegressor::fit(feature_names, x.clone(), y.clone())?;
        let rmse = regressor.rmse(&x, &y);
        let samples = x.nrows();

        let artifact = ModelArtifact::new(
            SessionKey {
                year,
                race: race.to_string(),
                session: session.to_string(),
            },
            samples,
            regressor,
        );
        let published = self.store.publish(artifact)?;

        info!(rmse, samples, "training run complete");
        Ok(TrainingOutcome {
            samples,
            feature_count: published.regressor.feature_names().len(),
            rmse,
            trained_at: published.trained_at,
        })
    }
}

fn data_unavailable(year: u16, race: &str, session: &str) -> PitwallError {
    PitwallError::DataUnavailable {
        year,
        race: race.to_string(),
        session: session.to_string(),
    }
}

/// The feature schema for a prepared frame: base numerics that are
/// actually present, then the full indicator vocabulary. The indicator
/// set never depends on which categories the batch happened to contain,
/// so two sessions always produce comparable schemas.
fn feature_order(frame: &Frame) -> Vec<String> {
    let mut names: Vec<String> = BASE_FEATURES
        .iter()
        .filter(|name| frame.has_column(name))
        .map(|name| name.to_string())
        .collect();
    for compound in COMPOUNDS {
        names.push(format!("compound_{compound}"));
    }
    for team in TEAMS {
        names.push(team_column_name(team));
    }
    names
}

/// Select the feature columns and target, keeping only rows with a known
/// lap time. Remaining non-numeric cells take the neutral zero default.
fn build_training_matrix(
    frame: &Frame,
) -> Result<(Vec<String>, Array2<f64>, Array1<f64>), PitwallError> {
    let target = frame.column(TARGET_COLUMN).ok_or_else(|| {
        PitwallError::Training(format!("prepared frame has no {TARGET_COLUMN} column"))
    })?;

    let keep: Vec<usize> = target
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| as_f64(cell).map(|_| i))
        .collect();
    if keep.len() < frame.num_rows() {
        debug!(
            dropped = frame.num_rows() - keep.len(),
            "dropping laps without a recorded lap time"
        );
    }

    let feature_names = feature_order(frame);
    let mut x = Array2::<f64>::zeros((keep.len(), feature_names.len()));
    for (j, name) in feature_names.iter().enumerate() {
        let Some(cells) = frame.column(name) else {
            continue; // absent indicator columns stay all-zero
        };
        for (i, &row) in keep.iter().enumerate() {
            x[[i, j]] = coerce_f64(&cells[row]);
        }
    }

    let y = Array1::from_iter(keep.iter().map(|&row| coerce_f64(&target[row])));
    Ok((feature_names, x, y))
}
