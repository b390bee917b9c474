//! Telemetry data source
//!
//! The training orchestrator consumes lap records through the
//! `TelemetrySource` trait; the shipped implementation reads columnar
//! session archives from a data directory. Archive column names are the
//! upstream export casing (`LapNumber`, `TyreLife`, ...) so the
//! normalizer is exercised end to end.

use crate::error::PitwallError;
use crate::frame::Frame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source of raw lap records for a (year, race, session) key.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_session(
        &self,
        year: u16,
        race: &str,
        session: &str,
    ) -> Result<Frame, PitwallError>;
}

/// Columnar on-disk session archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionArchive {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SessionArchive {
    /// Transpose into a frame. Rows whose width does not match the header
    /// are dropped with a warning; they carry no usable signal.
    pub fn into_frame(self) -> Frame {
        let width = self.columns.len();
        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); width];
        for (i, row) in self.rows.into_iter().enumerate() {
            if row.len() != width {
                warn!(row = i, expected = width, got = row.len(), "skipping ragged archive row");
                continue;
            }
            for (j, cell) in row.into_iter().enumerate() {
                cells[j].push(cell);
            }
        }
        Frame::from_columns(self.columns.into_iter().zip(cells).collect())
    }
}

/// Filesystem-backed telemetry source reading
/// `<data_dir>/<year>_<race-slug>_<session-slug>.json`.
pub struct SessionArchiveSource {
    data_dir: PathBuf,
}

impl SessionArchiveSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn archive_path(&self, year: u16, race: &str, session: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}_{}.json", year, slug(race), slug(session)))
    }
}

/// Lowercased, spaces collapsed to hyphens.
fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

fn data_unavailable(year: u16, race: &str, session: &str) -> PitwallError {
    PitwallError::DataUnavailable {
        year,
        race: race.to_string(),
        session: session.to_string(),
    }
}

#[async_trait]
impl TelemetrySource for SessionArchiveSource {
    async fn fetch_session(
        &self,
        year: u16,
        race: &str,
        session: &str,
    ) -> Result<Frame, PitwallError> {
        let path = self.archive_path(year, race, session);
        debug!(path = %path.display(), "reading session archive");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(data_unavailable(year, race, session));
            }
            Err(e) => return Err(e.into()),
        };

        let archive: SessionArchive = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %path.display(), error = %e, "unreadable session archive");
            data_unavailable(year, race, session)
        })?;

        Ok(archive.into_frame())
    }
}

/// Fixed in-memory source for tests and demos.
pub struct StaticSource {
    frame: Frame,
}

impl StaticSource {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }
}

#[async_trait]
impl TelemetrySource for StaticSource {
    async fn fetch_session(
        &self,
        _year: u16,
        _race: &str,
        _session: &str,
    ) -> Result<Frame, PitwallError> {
        Ok(self.frame.clone())
    }
}
