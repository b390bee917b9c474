//! Core data models for the prediction service

use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One lap observation to predict a lap time for. Field names are already
/// canonical snake_case on the wire; the pipeline still normalizes so the
/// inference path and the training path share one code path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub compound: String,
    pub stint: i64,
    pub lap_number: i64,
    pub tyre_life: i64,
    pub track_status: f64,
    pub air_temp: f64,
    pub track_temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub fresh_tyre: bool,
    pub team: String,
    pub driver: String,
}

impl PredictionInput {
    /// Single-row tabular form for the feature pipeline.
    pub fn to_frame(&self) -> Frame {
        Frame::from_columns(vec![
            ("compound".to_string(), vec![json!(self.compound)]),
            ("stint".to_string(), vec![json!(self.stint)]),
            ("lap_number".to_string(), vec![json!(self.lap_number)]),
            ("tyre_life".to_string(), vec![json!(self.tyre_life)]),
            ("track_status".to_string(), vec![json!(self.track_status)]),
            ("air_temp".to_string(), vec![json!(self.air_temp)]),
            ("track_temp".to_string(), vec![json!(self.track_temp)]),
            ("humidity".to_string(), vec![json!(self.humidity)]),
            ("wind_speed".to_string(), vec![json!(self.wind_speed)]),
            ("fresh_tyre".to_string(), vec![json!(self.fresh_tyre)]),
            ("team".to_string(), vec![json!(self.team)]),
            ("driver".to_string(), vec![json!(self.driver)]),
        ])
    }
}

/// Summary of a completed training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub samples: usize,
    pub feature_count: usize,
    pub rmse: f64,
    pub trained_at: i64,
}
