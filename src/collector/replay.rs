//! Replays recorded sample files through the engine.
//!
//! Recordings exist in two shapes: early files are a bare JSON array of
//! samples, later ones are full export documents with a `data` field.
//! Both parse here.

use crate::collector::types::RawSample;
use crate::collector::CollectorError;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Deserialize;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// How fast a replay delivers its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pace {
    /// Sleep between samples according to their recorded timestamps
    Recorded,
    /// Deliver as fast as the channel accepts
    #[default]
    Full,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordedFile {
    Document { data: Vec<RawSample> },
    Samples(Vec<RawSample>),
}

/// Parse a recording file into its samples.
pub fn read_samples(path: &Path) -> Result<Vec<RawSample>, CollectorError> {
    let content = std::fs::read_to_string(path).map_err(|e| CollectorError::Io(e.to_string()))?;
    let file: RecordedFile =
        serde_json::from_str(&content).map_err(|e| CollectorError::Parse(e.to_string()))?;

    Ok(match file {
        RecordedFile::Document { data } => data,
        RecordedFile::Samples(samples) => samples,
    })
}

/// Delivers a fixed set of recorded samples over a channel.
pub struct ReplayCollector {
    samples: Option<Vec<RawSample>>,
    pace: Pace,
    sender: Option<Sender<RawSample>>,
    receiver: Receiver<RawSample>,
}

impl ReplayCollector {
    /// Create a collector over an in-memory sample list.
    pub fn new(samples: Vec<RawSample>, pace: Pace) -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            samples: Some(samples),
            pace,
            sender: Some(sender),
            receiver,
        }
    }

    /// Create a collector from a recording file.
    pub fn from_file(path: &Path, pace: Pace) -> Result<Self, CollectorError> {
        Ok(Self::new(read_samples(path)?, pace))
    }

    /// Number of samples queued for delivery.
    pub fn remaining(&self) -> usize {
        self.samples.as_ref().map_or(0, Vec::len)
    }

    /// Start delivering samples on a background thread.
    ///
    /// The channel disconnects once every sample was sent, which is how
    /// consumers detect the end of the replay.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        let samples = self.samples.take().ok_or(CollectorError::AlreadyRunning)?;
        // The sender moves into the thread, so the channel closes when
        // the thread finishes.
        let sender = self.sender.take().ok_or(CollectorError::AlreadyRunning)?;
        let pace = self.pace;

        thread::spawn(move || {
            let mut previous_ts: Option<u64> = None;
            for sample in samples {
                if pace == Pace::Recorded {
                    if let Some(prev) = previous_ts {
                        let gap = sample.timestamp.saturating_sub(prev);
                        thread::sleep(Duration::from_millis(gap));
                    }
                    previous_ts = Some(sample.timestamp);
                }
                if sender.send(sample).is_err() {
                    break;
                }
            }
        });

        Ok(())
    }

    /// Get the receiver for replayed samples.
    pub fn receiver(&self) -> &Receiver<RawSample> {
        &self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::Vec3;
    use std::io::Write;

    fn sample_json() -> String {
        serde_json::to_string(&vec![
            RawSample {
                timestamp: 0,
                gravity: Some(Vec3::new(0.0, 9.5, 0.5)),
                rotation: Default::default(),
            },
            RawSample {
                timestamp: 16,
                gravity: Some(Vec3::new(0.1, 9.4, 0.6)),
                rotation: Default::default(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_read_bare_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", sample_json()).unwrap();

        let samples = read_samples(file.path()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].timestamp, 16);
    }

    #[test]
    fn test_read_document_envelope() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"detected_position": "Sitzend", "actual_position": null,
                "location": "Büro", "data": {}}}"#,
            sample_json()
        )
        .unwrap();

        let samples = read_samples(file.path()).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_replay_delivers_all_samples_then_disconnects() {
        let samples: Vec<RawSample> = (0..50)
            .map(|i| RawSample {
                timestamp: i * 16,
                gravity: Some(Vec3::new(0.0, 9.5, 0.5)),
                rotation: Default::default(),
            })
            .collect();

        let mut collector = ReplayCollector::new(samples, Pace::Full);
        let receiver = collector.receiver().clone();
        collector.start().unwrap();

        let delivered: Vec<RawSample> = receiver.iter().collect();
        assert_eq!(delivered.len(), 50);
        assert_eq!(delivered[49].timestamp, 49 * 16);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut collector = ReplayCollector::new(Vec::new(), Pace::Full);
        collector.start().unwrap();
        assert!(matches!(
            collector.start(),
            Err(CollectorError::AlreadyRunning)
        ));
    }
}
