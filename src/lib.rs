//! Sitstand Sensor Agent - posture tracking from handheld motion sensors.
//!
//! This library ingests a stream of tri-axial motion samples (acceleration
//! including gravity plus rotation rate), classifies the carrier's posture
//! as sitting or standing in real time, tracks cumulative time per posture,
//! and optionally records labeled sessions to JSON files.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Sitstand Sensor Agent                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐    ┌──────────────────────────────────────┐   │
//! │  │ Collector │───▶│               Session                │   │
//! │  │(stdin/    │    │  ┌──────────────┐  ┌──────────────┐  │   │
//! │  │  replay)  │    │  │ SampleWindow │─▶│  Classifier  │  │   │
//! │  └───────────┘    │  └──────────────┘  └──────────────┘  │   │
//! │                   │  time accumulators │ export buffer   │   │
//! │                   └─────────┬──────────┴───────┬─────────┘   │
//! │                             ▼                  ▼             │
//! │                     ┌──────────────┐   ┌──────────────┐      │
//! │                     │   History    │   │   Exporter   │      │
//! │                     │ (per-day)    │   │ (JSON files) │      │
//! │                     └──────────────┘   └──────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The classifier deliberately does no sensor fusion: it thresholds window
//! averages of the gravity vector, with a variance gate that keeps the
//! previous label while the device is moving.
//!
//! # Example
//!
//! ```
//! use sitstand_sensor_agent::collector::{RawSample, Vec3};
//! use sitstand_sensor_agent::core::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.start_measuring(0).expect("session is idle");
//!
//! for i in 1..=40u64 {
//!     let sample = RawSample {
//!         timestamp: i * 16,
//!         gravity: Some(Vec3::new(0.0, 9.5, 0.5)),
//!         rotation: Default::default(),
//!     };
//!     session.ingest(sample).expect("measuring");
//! }
//!
//! assert_eq!(session.current_posture(), "Stehend");
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod export;
pub mod history;

// Re-export key types at crate root for convenience
pub use collector::{CollectorError, RawSample, SensorSample};
pub use config::{Config, ConfigError};
pub use core::{
    Classification, ClassifierConfig, Posture, PostureClassifier, SampleWindow, Session,
    SessionConfig, SessionError,
};
pub use export::{FileExporter, RecordingDocument, RecordingSink};
pub use history::{ActivityHistory, DayTotals};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
