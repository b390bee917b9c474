//! Lap-time regressor
//!
//! Lightly regularized linear regression over the reconciled feature
//! matrix. The one-hot indicator columns always span the full closed
//! vocabulary, so the design matrix is collinear whenever a session uses
//! more than one compound; ridge keeps the solve well posed where plain
//! least squares would reject it. The fitted model is deliberately plain:
//! the ordered feature names it was trained against, a coefficient per
//! feature, and an intercept. That is all an artifact needs to reproduce
//! predictions, and it serializes cleanly.

use crate::error::PitwallError;
use linfa::prelude::*;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Ridge penalty. Small enough to stay close to the least-squares fit,
/// large enough to keep collinear indicator columns solvable.
const RIDGE_PENALTY: f64 = 1e-3;

/// A fitted lap-time model plus the authoritative feature schema it was
/// trained with. `feature_names` is captured exactly once, here, and is
/// never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTimeRegressor {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LapTimeRegressor {
    /// Fit against a rows x features matrix and a target vector of lap
    /// times in seconds.
    pub fn fit(
        feature_names: Vec<String>,
        x: Array2<f64>,
        y: Array1<f64>,
    ) -> Result<Self, PitwallError> {
        if x.nrows() == 0 {
            return Err(PitwallError::Training("no rows to fit".to_string()));
        }
        if x.ncols() != feature_names.len() {
            return Err(PitwallError::Training(format!(
                "matrix has {} columns but {} feature names",
                x.ncols(),
                feature_names.len()
            )));
        }

        let dataset = Dataset::new(x, y);
        let model = ElasticNet::ridge()
            .penalty(RIDGE_PENALTY)
            .fit(&dataset)
            .map_err(|e| PitwallError::Training(e.to_string()))?;

        Ok(Self {
            feature_names,
            coefficients: model.hyperplane().to_vec(),
            intercept: model.intercept(),
        })
    }

    /// Rebuild a model from persisted parts (artifact load, tests).
    pub fn from_parts(feature_names: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            feature_names,
            coefficients,
            intercept,
        }
    }

    /// The ordered feature schema this model was trained against.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn predict_row(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.coefficients.len());
        self.intercept
            + features
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }

    pub fn predict(&self, x: &Array2<f64>) -> Vec<f64> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_row(row.as_slice().unwrap_or(&[])))
            .collect()
    }

    /// Root mean squared error against known targets, for training logs.
    pub fn rmse(&self, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let predictions = self.predict(x);
        let sum_sq: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        (sum_sq / y.len() as f64).sqrt()
    }
}
