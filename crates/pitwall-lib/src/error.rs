//! Error taxonomy for the prediction pipeline
//!
//! Shape and type problems inside the pipeline are always recovered locally
//! with neutral defaults; only the total absence of data (no rows for a
//! session, no trained schema) surfaces as an error to the caller.

use thiserror::Error;

/// Errors surfaced by the pipeline and orchestrators
#[derive(Debug, Error)]
pub enum PitwallError {
    /// The telemetry source yielded no rows for the requested session.
    /// Callers should reject the race/session identifiers, not retry.
    #[error("no telemetry data for {year} {race} ({session})")]
    DataUnavailable {
        year: u16,
        race: String,
        session: String,
    },

    /// No trained model artifact is available. Remediation is to train,
    /// not to fix the request.
    #[error("no trained model available: {0}")]
    ModelUnavailable(String),

    /// The authoritative feature-name list is empty or the artifact is
    /// corrupt. Reconciliation refuses to proceed without a schema.
    #[error("no trained feature schema: {0}")]
    SchemaUnavailable(String),

    /// The request itself could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Model fitting failed.
    #[error("training failed: {0}")]
    Training(String),

    /// Artifact I/O failed.
    #[error("artifact storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Invariant violation inside the pipeline (poisoned lock, empty
    /// prediction output).
    #[error("internal error: {0}")]
    Internal(String),
}

impl PitwallError {
    /// True when the condition is fixed by training a model rather than
    /// by changing the request.
    pub fn is_model_missing(&self) -> bool {
        matches!(
            self,
            PitwallError::ModelUnavailable(_) | PitwallError::SchemaUnavailable(_)
        )
    }
}
