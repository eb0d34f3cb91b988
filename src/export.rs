//! Recording export.
//!
//! A stopped recording is handed off as a single JSON document containing
//! the retained samples plus the labels needed for offline analysis. The
//! file name embeds the activity label and an ISO-8601 timestamp with `:`
//! replaced by `_` so it stays a valid name on every filesystem.

use crate::collector::types::SensorSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The document written for one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingDocument {
    /// Posture the classifier had committed when the recording stopped
    pub detected_position: String,
    /// Ground-truth activity label given at `start_recording`, if any
    pub actual_position: Option<String>,
    /// Where the recording was made (free-form, from configuration)
    pub location: String,
    /// Retained samples, oldest first
    pub data: Vec<SensorSample>,
}

/// Errors raised while handing a recording off.
#[derive(Debug)]
pub enum ExportError {
    Serialize(String),
    Io(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Serialize(e) => write!(f, "Serialize error: {e}"),
            ExportError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Destination for stopped recordings.
///
/// The session hands every non-empty export buffer to a sink; a failing
/// sink leaves the buffer in place so the caller can retry.
pub trait RecordingSink {
    /// Persist the document, returning an identifier for what was written
    /// (the file path for file-based sinks).
    fn export(&mut self, document: &RecordingDocument) -> Result<PathBuf, ExportError>;
}

/// Writes recording documents as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct FileExporter {
    directory: PathBuf,
}

impl FileExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Build the export file name for a label at a point in time.
    pub fn file_name(label: &str, at: DateTime<Utc>) -> String {
        let stamp = at.format("%Y-%m-%dT%H_%M_%S%.3fZ");
        format!("sensor_data_{label}_{stamp}.json")
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl RecordingSink for FileExporter {
    fn export(&mut self, document: &RecordingDocument) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| ExportError::Io(e.to_string()))?;

        let label = document
            .actual_position
            .as_deref()
            .unwrap_or("unlabeled")
            .replace(char::is_whitespace, "-");
        let path = self.directory.join(Self::file_name(&label, Utc::now()));

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| ExportError::Serialize(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| ExportError::Io(e.to_string()))?;

        Ok(path)
    }
}
