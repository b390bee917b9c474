//! Trained model artifact persistence
//!
//! One JSON file per trained model: the fitted regressor together with
//! the ordered feature-name list it was trained against, plus a checksum
//! so a corrupt artifact is detected at load rather than at predict. The
//! file is published atomically (temp file, fsync, rename); a half-written
//! artifact is never observable. In memory the artifact is a replace-only
//! handle: readers take an `Arc` snapshot, the training path swaps the
//! whole thing after a successful run.

use crate::error::PitwallError;
use crate::regressor::LapTimeRegressor;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Bumped when the artifact layout changes incompatibly.
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// The (year, race, session) key a model was trained from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionKey {
    pub year: u16,
    pub race: String,
    pub session: String,
}

/// Persisted unit: fitted regressor plus provenance and integrity data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub trained_at: i64,
    pub session: SessionKey,
    pub samples: usize,
    pub checksum: String,
    pub regressor: LapTimeRegressor,
}

impl ModelArtifact {
    pub fn new(session: SessionKey, samples: usize, regressor: LapTimeRegressor) -> Self {
        let checksum = regressor_checksum(&regressor);
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            trained_at: chrono::Utc::now().timestamp(),
            session,
            samples,
            checksum,
            regressor,
        }
    }

    /// Integrity and usability checks applied on every load. A failure
    /// here is the corrupt-artifact flavour of a missing schema.
    pub fn verify(&self) -> Result<(), PitwallError> {
        if self.regressor.feature_names().is_empty() {
            return Err(PitwallError::SchemaUnavailable(
                "artifact carries an empty feature-name list".to_string(),
            ));
        }
        let computed = regressor_checksum(&self.regressor);
        if computed != self.checksum {
            return Err(PitwallError::SchemaUnavailable(format!(
                "artifact checksum mismatch: expected {}, got {}",
                self.checksum, computed
            )));
        }
        Ok(())
    }
}

fn regressor_checksum(regressor: &LapTimeRegressor) -> String {
    let mut hasher = Sha256::new();
    // Struct field order makes this serialization deterministic.
    hasher.update(serde_json::to_vec(regressor).unwrap_or_default());
    hex::encode(hasher.finalize())
}

/// Owns the well-known artifact path and the swappable in-memory handle.
pub struct ArtifactStore {
    path: PathBuf,
    current: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the currently loaded artifact, if any.
    pub fn current(&self) -> Option<Arc<ModelArtifact>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Loaded artifact, loading lazily from disk on first use. Absent or
    /// corrupt artifacts surface as the model-unavailable condition.
    pub fn get_or_load(&self) -> Result<Arc<ModelArtifact>, PitwallError> {
        if let Some(artifact) = self.current() {
            return Ok(artifact);
        }

        let artifact = Arc::new(self.load()?);
        let mut guard = self
            .current
            .write()
            .map_err(|e| PitwallError::Internal(format!("artifact lock poisoned: {e}")))?;
        // Another caller may have won the race; keep whichever is there.
        if let Some(existing) = guard.as_ref() {
            return Ok(existing.clone());
        }
        *guard = Some(artifact.clone());
        debug!(path = %self.path.display(), "loaded model artifact");
        Ok(artifact)
    }

    /// Read and verify the artifact file without touching the handle.
    pub fn load(&self) -> Result<ModelArtifact, PitwallError> {
        if !self.path.exists() {
            return Err(PitwallError::ModelUnavailable(format!(
                "no artifact at {}; train a model first",
                self.path.display()
            )));
        }
        let bytes = fs::read(&self.path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes).map_err(|e| {
            PitwallError::SchemaUnavailable(format!(
                "artifact at {} is unreadable: {e}",
                self.path.display()
            ))
        })?;
        artifact.verify()?;
        Ok(artifact)
    }

    /// Persist atomically, then swap the in-memory handle wholesale so
    /// concurrent readers never observe a torn model.
    pub fn publish(&self, artifact: ModelArtifact) -> Result<Arc<ModelArtifact>, PitwallError> {
        self.save(&artifact)?;

        let artifact = Arc::new(artifact);
        match self.current.write() {
            Ok(mut guard) => *guard = Some(artifact.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(artifact.clone()),
        }

        info!(
            path = %self.path.display(),
            samples = artifact.samples,
            features = artifact.regressor.feature_names().len(),
            "published model artifact"
        );
        Ok(artifact)
    }

    fn save(&self, artifact: &ModelArtifact) -> Result<(), PitwallError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(artifact)
            .map_err(|e| PitwallError::Internal(format!("artifact serialization failed: {e}")))?;

        // Write to temp file first, publish by rename.
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            // Best effort cleanup; the temp file must not shadow the real one.
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(error = %cleanup, "failed to remove stale temp artifact");
            }
            return Err(e.into());
        }
        Ok(())
    }
}
