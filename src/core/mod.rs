//! Core functionality of the sitstand sensor agent.
//!
//! This module contains:
//! - The bounded sample window and its per-axis statistics
//! - The motion-gated posture classifier
//! - The session state machine with time accounting and the export buffer

pub mod classifier;
pub mod session;
pub mod window;

// Re-export commonly used types
pub use classifier::{
    Classification, ClassifierConfig, Posture, PostureClassifier, SecondaryAxis,
};
pub use session::{
    format_mm_ss, Session, SessionConfig, SessionError, SessionStats, DEFAULT_EXPORT_CAPACITY,
};
pub use window::{Axis, SampleWindow, DEFAULT_WINDOW_SIZE};
