//! Pitwall - race lap-time prediction
//!
//! Core library for the prediction service: the feature pipeline
//! (normalization, categorical encoding, derived features, schema
//! reconciliation), the training and inference orchestrators, model
//! artifact persistence and pit-strategy advice.
//!
//! The central invariant is schema authority: the ordered feature-name
//! list captured at training time is the only schema, and every
//! prediction input is conformed to it exactly before touching the model.

pub mod artifact;
pub mod error;
pub mod frame;
pub mod inference;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod regressor;
pub mod source;
pub mod strategy;
pub mod training;

pub use artifact::{ArtifactStore, ModelArtifact, SessionKey};
pub use error::PitwallError;
pub use frame::Frame;
pub use inference::LapTimePredictor;
pub use models::{PredictionInput, TrainingOutcome};
pub use observability::PipelineMetrics;
pub use regressor::LapTimeRegressor;
pub use source::{SessionArchiveSource, StaticSource, TelemetrySource};
pub use strategy::{
    advise_or_fallback, HeuristicAdvisor, StrategyAdvice, StrategyAdvisor, StrategyContext,
};
pub use training::TrainingPipeline;
