//! Per-day posture totals persisted across runs.
//!
//! Every finished measurement adds its sitting and standing seconds to the
//! current day's entry. The file is a small JSON map keyed by date, loaded
//! on startup and rewritten on save.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Accumulated posture time for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub sitting_secs: f64,
    pub standing_secs: f64,
}

/// Errors while loading or saving the history file.
#[derive(Debug)]
pub enum HistoryError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::Io(e) => write!(f, "IO error: {e}"),
            HistoryError::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for HistoryError {}

/// Daily activity history backed by a JSON file.
#[derive(Debug)]
pub struct ActivityHistory {
    path: PathBuf,
    days: BTreeMap<NaiveDate, DayTotals>,
}

impl ActivityHistory {
    /// Load the history at `path`, starting empty if the file is missing.
    pub fn load(path: PathBuf) -> Result<Self, HistoryError> {
        let days = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| HistoryError::Io(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| HistoryError::Parse(e.to_string()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, days })
    }

    /// Add a finished measurement to the given day.
    pub fn record(&mut self, date: NaiveDate, sitting_secs: f64, standing_secs: f64) {
        let entry = self.days.entry(date).or_default();
        entry.sitting_secs += sitting_secs;
        entry.standing_secs += standing_secs;
    }

    /// Add a finished measurement to today's entry.
    pub fn record_today(&mut self, sitting_secs: f64, standing_secs: f64) {
        self.record(Utc::now().date_naive(), sitting_secs, standing_secs);
    }

    /// Totals for the given day, zero when nothing was recorded.
    pub fn day(&self, date: NaiveDate) -> DayTotals {
        self.days.get(&date).copied().unwrap_or_default()
    }

    /// Totals for today.
    pub fn today(&self) -> DayTotals {
        self.day(Utc::now().date_naive())
    }

    /// Number of days with recorded activity.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Write the history back to its file.
    pub fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::Io(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&self.days)
            .map_err(|e| HistoryError::Parse(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| HistoryError::Io(e.to_string()))
    }
}
