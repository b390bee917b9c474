//! Inference orchestrator
//!
//! Runs one lap observation through the same normalize/encode stages the
//! training path uses, then conforms the result to the trained feature
//! schema before predicting. The model handle is the store's swappable
//! artifact; a concurrent retrain never tears a prediction in half.

use crate::artifact::ArtifactStore;
use crate::error::PitwallError;
use crate::models::PredictionInput;
use crate::pipeline::{encode, normalize, reconcile};
use std::sync::Arc;
use tracing::debug;

pub struct LapTimePredictor {
    store: Arc<ArtifactStore>,
}

impl LapTimePredictor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Predicted lap time in seconds for one observation.
    pub fn predict(&self, input: &PredictionInput) -> Result<f64, PitwallError> {
        let artifact = self.store.get_or_load()?;

        let mut frame = input.to_frame();
        normalize::normalize(&mut frame);
        encode::encode_categoricals(&mut frame);

        let matrix = reconcile::conform(&frame, artifact.regressor.feature_names())?;
        debug!(
            features = matrix.ncols(),
            "reconciled observation against trained schema"
        );

        let predictions = artifact.regressor.predict(&matrix);
        let value = predictions
            .first()
            .copied()
            .ok_or_else(|| PitwallError::Internal("regressor returned no prediction".to_string()))?;
        if !value.is_finite() {
            return Err(PitwallError::Internal(format!(
                "regressor returned a non-finite lap time: {value}"
            )));
        }
        Ok(value)
    }
}
