//! Measurement and recording session management.
//!
//! The session owns all mutable engine state: the classification window,
//! the per-posture time accumulators, and the export buffer of retained
//! samples. Measuring and recording toggle independently; recording is an
//! overlay on the sample feed, not a separate mode.
//!
//! All mutation happens on the single path that delivers samples and
//! commands. Readers (the periodic display refresh) only format values
//! that have already been committed.

use crate::collector::types::{RawSample, SensorSample};
use crate::core::classifier::{Classification, ClassifierConfig, Posture, PostureClassifier};
use crate::core::window::{SampleWindow, DEFAULT_WINDOW_SIZE};
use crate::export::{ExportError, RecordingDocument, RecordingSink};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use uuid::Uuid;

/// Default capacity of the export buffer (~5 minutes at 60 Hz).
pub const DEFAULT_EXPORT_CAPACITY: usize = 18_000;

/// Parameters a session is created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Classification window size in samples
    pub window_size: usize,
    /// Maximum number of samples retained for export
    pub export_capacity: usize,
    /// Free-form location tag written into recording documents
    pub location: String,
    /// Posture decision thresholds
    pub classifier: ClassifierConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            export_capacity: DEFAULT_EXPORT_CAPACITY,
            location: "unbekannt".to_string(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Errors surfaced by session commands. None of them are fatal; the
/// caller can always re-issue a command.
#[derive(Debug)]
pub enum SessionError {
    /// A measuring-only command arrived while idle
    NotMeasuring,
    /// `start_measuring` while already measuring
    AlreadyMeasuring,
    /// `stop_recording` without an active recording
    NotRecording,
    /// The ingested sample had no gravity vector and was dropped
    MalformedSample { timestamp: u64 },
    /// The recording sink failed; the buffer is retained for retry
    Export(ExportError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotMeasuring => write!(f, "No measurement is running"),
            SessionError::AlreadyMeasuring => write!(f, "A measurement is already running"),
            SessionError::NotRecording => write!(f, "No recording is running"),
            SessionError::MalformedSample { timestamp } => {
                write!(f, "Sample at {timestamp}ms has no gravity vector")
            }
            SessionError::Export(e) => write!(f, "Export failed: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ExportError> for SessionError {
    fn from(e: ExportError) -> Self {
        SessionError::Export(e)
    }
}

/// Counters describing what a session has processed so far.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub samples_ingested: u64,
    pub malformed_dropped: u64,
    pub recordings_exported: u64,
}

/// The recording overlay: a label plus the bounded buffer of retained
/// samples.
#[derive(Debug, Clone)]
struct Recording {
    label: Option<String>,
    buffer: VecDeque<SensorSample>,
}

/// A posture-tracking session.
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    classifier: PostureClassifier,
    window: SampleWindow,
    recording: Option<Recording>,
    measuring: bool,
    start_ms: Option<u64>,
    last_update_ms: Option<u64>,
    sitting_secs: f64,
    standing_secs: f64,
    last_position: Option<Posture>,
    stats: SessionStats,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            classifier: PostureClassifier::new(config.classifier),
            window: SampleWindow::new(config.window_size),
            recording: None,
            measuring: false,
            start_ms: None,
            last_update_ms: None,
            sitting_secs: 0.0,
            standing_secs: 0.0,
            last_position: None,
            stats: SessionStats::default(),
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Number of samples currently retained for export.
    pub fn export_buffer_len(&self) -> usize {
        self.recording.as_ref().map_or(0, |r| r.buffer.len())
    }

    /// Begin a measurement at `now_ms`. Accumulators and the window are
    /// reset; previously accumulated time is discarded.
    pub fn start_measuring(&mut self, now_ms: u64) -> Result<(), SessionError> {
        if self.measuring {
            return Err(SessionError::AlreadyMeasuring);
        }

        self.sitting_secs = 0.0;
        self.standing_secs = 0.0;
        self.last_position = None;
        self.window.clear();
        self.start_ms = Some(now_ms);
        self.last_update_ms = Some(now_ms);
        self.measuring = true;
        Ok(())
    }

    /// End the running measurement. Accumulated seconds stay readable;
    /// only the transient window state is cleared. A second call in a row
    /// is a surfaced no-op.
    pub fn stop_measuring(&mut self) -> Result<(), SessionError> {
        if !self.measuring {
            return Err(SessionError::NotMeasuring);
        }

        self.measuring = false;
        self.window.clear();
        Ok(())
    }

    /// Begin (or restart) recording under the given activity label.
    ///
    /// Valid at any time, measuring or not. Any previously buffered
    /// samples are discarded.
    pub fn start_recording(&mut self, label: Option<String>) {
        self.recording = Some(Recording {
            label,
            buffer: VecDeque::with_capacity(self.config.export_capacity.min(1024)),
        });
    }

    /// Stop recording and hand the buffered samples to `sink`.
    ///
    /// Returns the sink's identifier for the written document, or `None`
    /// when nothing was buffered. If the sink fails, the recording state
    /// and buffer are kept so the command can be retried.
    pub fn stop_recording(
        &mut self,
        sink: &mut dyn RecordingSink,
    ) -> Result<Option<PathBuf>, SessionError> {
        let recording = self.recording.as_ref().ok_or(SessionError::NotRecording)?;

        if recording.buffer.is_empty() {
            self.recording = None;
            return Ok(None);
        }

        let document = RecordingDocument {
            detected_position: self.current_posture().to_string(),
            actual_position: recording.label.clone(),
            location: self.config.location.clone(),
            data: recording.buffer.iter().copied().collect(),
        };

        let path = sink.export(&document)?;

        self.recording = None;
        self.stats.recordings_exported += 1;
        Ok(Some(path))
    }

    /// Feed one raw sample through validation, the window, the classifier
    /// and the time accumulators.
    ///
    /// The elapsed time since the previous sample is attributed to the
    /// posture that was committed *before* this classification runs, so
    /// attribution lags the label by one tick. That lag matches the
    /// observed behavior of the detector and is kept intentionally.
    pub fn ingest(&mut self, raw: RawSample) -> Result<Classification, SessionError> {
        if !self.measuring {
            return Err(SessionError::NotMeasuring);
        }

        let sample = SensorSample::try_from(raw).map_err(|e| {
            self.stats.malformed_dropped += 1;
            SessionError::MalformedSample {
                timestamp: e.timestamp,
            }
        })?;

        self.window.push(sample);
        if let Some(recording) = self.recording.as_mut() {
            if recording.buffer.len() == self.config.export_capacity {
                recording.buffer.pop_front();
            }
            recording.buffer.push_back(sample);
        }

        let result = self.classifier.classify(&self.window, self.last_position);

        // Timestamps are non-decreasing within a session; a regression
        // contributes zero rather than panicking.
        let last = self.last_update_ms.unwrap_or(sample.timestamp);
        let delta_secs = sample.timestamp.saturating_sub(last) as f64 / 1000.0;
        match self.last_position {
            Some(Posture::Standing) => self.standing_secs += delta_secs,
            // Before the first classification the no-decision default
            // (sitting) is in effect.
            Some(Posture::Sitting) | None => self.sitting_secs += delta_secs,
        }

        self.last_position = Some(result.posture);
        self.last_update_ms = Some(sample.timestamp);
        self.stats.samples_ingested += 1;

        Ok(result)
    }

    /// Seconds attributed to sitting since the measurement started.
    pub fn sitting_seconds(&self) -> f64 {
        self.sitting_secs
    }

    /// Seconds attributed to standing since the measurement started.
    pub fn standing_seconds(&self) -> f64 {
        self.standing_secs
    }

    /// The committed posture label, `"Sitzend"` until decided otherwise.
    pub fn current_posture(&self) -> &'static str {
        self.last_position.unwrap_or(Posture::Sitting).label()
    }

    /// Sitting time formatted as MM:SS.
    pub fn sitting_time(&self) -> String {
        format_mm_ss(self.sitting_secs)
    }

    /// Standing time formatted as MM:SS.
    pub fn standing_time(&self) -> String {
        format_mm_ss(self.standing_secs)
    }

    /// Wall time between measurement start and the last sample, as MM:SS.
    pub fn elapsed_time(&self) -> String {
        format_mm_ss(self.elapsed_seconds())
    }

    /// Wall time between measurement start and the last sample.
    pub fn elapsed_seconds(&self) -> f64 {
        match (self.start_ms, self.last_update_ms) {
            (Some(start), Some(last)) => last.saturating_sub(start) as f64 / 1000.0,
            _ => 0.0,
        }
    }

    /// Summary string printed when a session ends.
    pub fn summary(&self) -> String {
        format!(
            "Session {} statistics:\n\
             - Samples ingested: {}\n\
             - Malformed samples dropped: {}\n\
             - Recordings exported: {}\n\
             - Sitting: {} | Standing: {} | Elapsed: {}",
            self.id,
            self.stats.samples_ingested,
            self.stats.malformed_dropped,
            self.stats.recordings_exported,
            self.sitting_time(),
            self.standing_time(),
            self.elapsed_time(),
        )
    }
}

/// Format whole seconds as MM:SS. Minutes are not capped at an hour.
pub fn format_mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{RotationRate, Vec3};
    use crate::export::FileExporter;

    fn raw(ts: u64, x: f64, y: f64, z: f64) -> RawSample {
        RawSample {
            timestamp: ts,
            gravity: Some(Vec3::new(x, y, z)),
            rotation: RotationRate::default(),
        }
    }

    fn small_session() -> Session {
        Session::new(SessionConfig {
            window_size: 4,
            export_capacity: 8,
            ..SessionConfig::default()
        })
    }

    /// Sink that always fails, for retry behavior.
    struct BrokenSink;

    impl RecordingSink for BrokenSink {
        fn export(&mut self, _: &RecordingDocument) -> Result<PathBuf, ExportError> {
            Err(ExportError::Io("disk full".to_string()))
        }
    }

    /// Sink that remembers the last document instead of writing it.
    #[derive(Default)]
    struct CaptureSink {
        last: Option<RecordingDocument>,
    }

    impl RecordingSink for CaptureSink {
        fn export(&mut self, doc: &RecordingDocument) -> Result<PathBuf, ExportError> {
            self.last = Some(doc.clone());
            Ok(PathBuf::from("captured.json"))
        }
    }

    #[test]
    fn test_ingest_requires_measuring() {
        let mut session = small_session();
        let err = session.ingest(raw(0, 0.0, 9.5, 0.5)).unwrap_err();
        assert!(matches!(err, SessionError::NotMeasuring));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        assert!(matches!(
            session.start_measuring(10),
            Err(SessionError::AlreadyMeasuring)
        ));
    }

    #[test]
    fn test_stop_twice_is_a_noop_second_time() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        for i in 1..=5 {
            session.ingest(raw(i * 1000, 0.0, 9.5, 0.5)).unwrap();
        }
        session.stop_measuring().unwrap();

        let sitting = session.sitting_seconds();
        let standing = session.standing_seconds();

        assert!(matches!(
            session.stop_measuring(),
            Err(SessionError::NotMeasuring)
        ));
        assert_eq!(session.sitting_seconds(), sitting);
        assert_eq!(session.standing_seconds(), standing);
    }

    #[test]
    fn test_malformed_sample_mutates_nothing() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        session.ingest(raw(1000, 0.0, 9.5, 0.5)).unwrap();

        let sitting = session.sitting_seconds();
        let err = session
            .ingest(RawSample {
                timestamp: 2000,
                gravity: None,
                rotation: RotationRate::default(),
            })
            .unwrap_err();

        assert!(matches!(err, SessionError::MalformedSample { timestamp: 2000 }));
        assert_eq!(session.sitting_seconds(), sitting);
        assert_eq!(session.stats().malformed_dropped, 1);
        // The dropped sample must not advance last_update either: the next
        // good sample carries the whole interval.
        session.ingest(raw(3000, 0.0, 9.5, 0.5)).unwrap();
        assert!((session.sitting_seconds() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_accumulators_cover_full_elapsed_time() {
        let mut session = Session::new(SessionConfig {
            window_size: 20,
            ..SessionConfig::default()
        });
        session.start_measuring(0).unwrap();

        // Alternate still/upright and still/flat stretches.
        for i in 1..=120u64 {
            let (y, z) = if (i / 30) % 2 == 0 { (9.5, 0.5) } else { (0.5, 9.7) };
            session.ingest(raw(i * 500, 0.0, y, z)).unwrap();
        }

        let total = session.sitting_seconds() + session.standing_seconds();
        assert!((total - session.elapsed_seconds()).abs() < 1e-6);
    }

    #[test]
    fn test_attribution_lags_by_one_tick() {
        let mut session = Session::new(SessionConfig {
            window_size: 1,
            ..SessionConfig::default()
        });
        session.start_measuring(0).unwrap();

        // First sample classifies as standing, but its delta was accrued
        // while no posture was committed, so it lands on sitting.
        session.ingest(raw(1000, 0.0, 9.5, 0.5)).unwrap();
        assert!((session.sitting_seconds() - 1.0).abs() < 1e-9);
        assert_eq!(session.standing_seconds(), 0.0);

        // Second sample classifies as sitting; its delta still lands on
        // the previously committed standing label.
        session.ingest(raw(2000, 0.3, 0.4, 9.7)).unwrap();
        assert!((session.standing_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_buffer_is_bounded_fifo() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        session.start_recording(Some("test".to_string()));

        for i in 0..12u64 {
            session.ingest(raw(i * 100, i as f64, 9.5, 0.5)).unwrap();
        }
        assert_eq!(session.export_buffer_len(), 8);

        let mut sink = CaptureSink::default();
        session.stop_recording(&mut sink).unwrap();
        let doc = sink.last.unwrap();

        // 12 pushed, cap 8: the first retained sample is the 4th pushed.
        assert_eq!(doc.data.len(), 8);
        assert_eq!(doc.data[0].gravity.x, 4.0);
        assert_eq!(doc.data[7].gravity.x, 11.0);
    }

    #[test]
    fn test_stop_recording_with_empty_buffer_exports_nothing() {
        let mut session = small_session();
        session.start_recording(None);

        let dir = tempfile::tempdir().unwrap();
        let mut exporter = FileExporter::new(dir.path());
        let result = session.stop_recording(&mut exporter).unwrap();

        assert!(result.is_none());
        assert!(!session.is_recording());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_export_keeps_buffer_for_retry() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        session.start_recording(Some("retry".to_string()));
        session.ingest(raw(100, 0.0, 9.5, 0.5)).unwrap();

        let mut broken = BrokenSink;
        let err = session.stop_recording(&mut broken).unwrap_err();
        assert!(matches!(err, SessionError::Export(_)));
        assert!(session.is_recording());
        assert_eq!(session.export_buffer_len(), 1);

        let mut sink = CaptureSink::default();
        let path = session.stop_recording(&mut sink).unwrap();
        assert!(path.is_some());
        assert!(!session.is_recording());
        assert_eq!(session.stats().recordings_exported, 1);
    }

    #[test]
    fn test_restarting_recording_clears_buffer() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        session.start_recording(Some("first".to_string()));
        session.ingest(raw(100, 0.0, 9.5, 0.5)).unwrap();
        assert_eq!(session.export_buffer_len(), 1);

        session.start_recording(Some("second".to_string()));
        assert_eq!(session.export_buffer_len(), 0);
    }

    #[test]
    fn test_document_carries_labels_and_location() {
        let mut session = Session::new(SessionConfig {
            window_size: 1,
            location: "Büro".to_string(),
            ..SessionConfig::default()
        });
        session.start_measuring(0).unwrap();
        session.start_recording(Some("stehend_still".to_string()));
        session.ingest(raw(100, 0.0, 9.5, 0.5)).unwrap();

        let mut sink = CaptureSink::default();
        session.stop_recording(&mut sink).unwrap();
        let doc = sink.last.unwrap();

        assert_eq!(doc.detected_position, "Stehend");
        assert_eq!(doc.actual_position.as_deref(), Some("stehend_still"));
        assert_eq!(doc.location, "Büro");
    }

    #[test]
    fn test_restart_resets_accumulators() {
        let mut session = small_session();
        session.start_measuring(0).unwrap();
        for i in 1..=5 {
            session.ingest(raw(i * 1000, 0.0, 9.5, 0.5)).unwrap();
        }
        session.stop_measuring().unwrap();
        assert!(session.sitting_seconds() + session.standing_seconds() > 0.0);

        session.start_measuring(10_000).unwrap();
        assert_eq!(session.sitting_seconds(), 0.0);
        assert_eq!(session.standing_seconds(), 0.0);
        assert_eq!(session.current_posture(), "Sitzend");
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0.0), "00:00");
        assert_eq!(format_mm_ss(59.9), "00:59");
        assert_eq!(format_mm_ss(125.0), "02:05");
        assert_eq!(format_mm_ss(3600.0), "60:00");
    }
}
