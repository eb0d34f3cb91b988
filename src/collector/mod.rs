//! Sample producers feeding the session engine.
//!
//! Samples arrive either live as line-delimited JSON on stdin or from a
//! previously recorded file. Both producers run on their own thread and
//! deliver over a bounded channel, so the engine sees one serial stream
//! regardless of the source.

pub mod replay;
pub mod stdin;
pub mod types;

// Re-export commonly used types
pub use replay::{Pace, ReplayCollector};
pub use stdin::StdinCollector;
pub use types::{MalformedSample, RawSample, RotationRate, SensorSample, Vec3};

/// Errors that can occur while producing samples.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    Io(String),
    Parse(String),
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::Io(e) => write!(f, "IO error: {e}"),
            CollectorError::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for CollectorError {}

/// Whether a motion-sensor source can be activated.
///
/// On handheld platforms sensor access sits behind a one-time user
/// gesture; here the producers read files or stdin, so the gate is always
/// open. It carries no classification semantics either way.
pub fn sensors_available() -> bool {
    true
}
