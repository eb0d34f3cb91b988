//! Sample types delivered by the sensor producers.
//!
//! The wire format mirrors what handheld devices emit: acceleration
//! including gravity in m/s² and rotation rate in °/s. Rotation is
//! frequently unavailable and defaults to zero; a missing gravity vector
//! makes a sample unusable for classification.

use serde::{Deserialize, Serialize};

/// A three-axis acceleration reading (m/s², gravity included).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Rotation rate around the three device axes (°/s).
///
/// Each component defaults to 0.0 when the device does not report it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationRate {
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
    #[serde(default)]
    pub gamma: f64,
}

/// A sample as it arrives on the wire, before validation.
///
/// Old recordings carry extra fields (`acceleration`, `isStanding`) which
/// are ignored on deserialization. The gravity vector may be absent when
/// the device sensor dropped out mid-stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    /// Monotonic timestamp in milliseconds
    pub timestamp: u64,
    /// Acceleration including gravity, if the sensor delivered one
    pub gravity: Option<Vec3>,
    /// Rotation rate, zeroed when unavailable
    #[serde(default)]
    pub rotation: RotationRate,
}

/// A validated sensor sample. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Monotonic timestamp in milliseconds
    pub timestamp: u64,
    /// Acceleration including gravity (m/s²)
    pub gravity: Vec3,
    /// Rotation rate (°/s)
    pub rotation: RotationRate,
}

impl SensorSample {
    pub fn new(timestamp: u64, gravity: Vec3) -> Self {
        Self {
            timestamp,
            gravity,
            rotation: RotationRate::default(),
        }
    }
}

/// A raw sample without a gravity vector cannot be classified.
#[derive(Debug, Clone, Copy)]
pub struct MalformedSample {
    /// Timestamp of the rejected sample, for the warning message
    pub timestamp: u64,
}

impl std::fmt::Display for MalformedSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sample at {}ms has no gravity vector and was dropped",
            self.timestamp
        )
    }
}

impl std::error::Error for MalformedSample {}

impl TryFrom<RawSample> for SensorSample {
    type Error = MalformedSample;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        match raw.gravity {
            Some(gravity) => Ok(SensorSample {
                timestamp: raw.timestamp,
                gravity,
                rotation: raw.rotation,
            }),
            None => Err(MalformedSample {
                timestamp: raw.timestamp,
            }),
        }
    }
}
