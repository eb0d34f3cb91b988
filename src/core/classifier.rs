//! Posture classification from window statistics.
//!
//! The decision rule is a variance-based motion gate in front of static
//! mean thresholds. It never integrates orientation; a phone lying flat
//! reads gravity on Z, a phone upright in a pocket reads it on Y, and the
//! classifier only checks which regime the window average sits in. That
//! makes it cheap and also makes its misclassifications part of the
//! observed behavior.

use crate::core::window::{Axis, SampleWindow};
use serde::{Deserialize, Serialize};

/// The binary posture label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Sitting,
    Standing,
}

impl Posture {
    /// Display label as shown to the carrier.
    pub fn label(&self) -> &'static str {
        match self {
            Posture::Sitting => "Sitzend",
            Posture::Standing => "Stehend",
        }
    }
}

/// Result of classifying one sample window. Recomputed per sample,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub posture: Posture,
    pub moving: bool,
}

impl Classification {
    /// The no-decision default emitted while the window is still filling.
    pub fn no_decision() -> Self {
        Self {
            posture: Posture::Sitting,
            moving: false,
        }
    }
}

/// Threshold configuration for the posture decision.
///
/// The threshold pairs drifted across field revisions of this detector
/// and no single set was ever validated as correct. The presets below
/// reproduce the observed revisions; pick per deployment rather than
/// trusting the default blindly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Total gravity variance (x+y+z) above which the window counts as moving
    pub motion_threshold: f64,
    /// Minimum |mean| on the vertical axis (Y) to signal standing
    pub vertical_threshold: f64,
    /// Axis whose |mean| must stay small while standing
    pub secondary_axis: SecondaryAxis,
    /// Maximum |mean| on the secondary axis to signal standing
    pub secondary_threshold: f64,
}

/// Which axis the standing rule checks against the secondary threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryAxis {
    X,
    Z,
}

impl Default for ClassifierConfig {
    /// Latest observed revision: near-vertical Y with Z close to zero.
    fn default() -> Self {
        Self {
            motion_threshold: 0.1,
            vertical_threshold: 8.5,
            secondary_axis: SecondaryAxis::Z,
            secondary_threshold: 2.0,
        }
    }
}

impl ClassifierConfig {
    /// Mid-series revision: |mean y| > 6.0 with |mean x| < 5.0.
    pub fn relaxed_xy() -> Self {
        Self {
            motion_threshold: 0.1,
            vertical_threshold: 6.0,
            secondary_axis: SecondaryAxis::X,
            secondary_threshold: 5.0,
        }
    }

    /// Earliest revision: |mean y| > 4.0 with |mean x| < 5.0.
    pub fn legacy_xy() -> Self {
        Self {
            motion_threshold: 0.1,
            vertical_threshold: 4.0,
            secondary_axis: SecondaryAxis::X,
            secondary_threshold: 5.0,
        }
    }
}

/// Classifies sample windows into sitting/standing with a motion gate.
#[derive(Debug, Clone, Default)]
pub struct PostureClassifier {
    config: ClassifierConfig,
}

impl PostureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the current window against the previously committed label.
    ///
    /// While the window is filling, the no-decision default is returned.
    /// Once full, the motion gate applies first: a moving window keeps the
    /// previous label unchanged (the device is assumed to still be in its
    /// prior posture mid-transition). Only a still window is re-classified
    /// from the mean thresholds.
    pub fn classify(
        &self,
        window: &SampleWindow,
        previous: Option<Posture>,
    ) -> Classification {
        if !window.is_full() {
            return Classification::no_decision();
        }

        // is_full() was checked, so the stats are all present.
        let stats = |axis| {
            (
                window.mean(axis).unwrap_or_default(),
                window.variance(axis).unwrap_or_default(),
            )
        };
        let (mean_x, var_x) = stats(Axis::X);
        let (mean_y, var_y) = stats(Axis::Y);
        let (mean_z, var_z) = stats(Axis::Z);

        let moving = var_x + var_y + var_z > self.config.motion_threshold;

        if moving {
            if let Some(prior) = previous {
                return Classification {
                    posture: prior,
                    moving: true,
                };
            }
        }

        let secondary_mean = match self.config.secondary_axis {
            SecondaryAxis::X => mean_x,
            SecondaryAxis::Z => mean_z,
        };

        let standing = mean_y.abs() > self.config.vertical_threshold
            && secondary_mean.abs() < self.config.secondary_threshold;

        Classification {
            posture: if standing {
                Posture::Standing
            } else {
                Posture::Sitting
            },
            moving,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{SensorSample, Vec3};
    use crate::core::window::DEFAULT_WINDOW_SIZE;

    fn full_window(gravity: Vec3) -> SampleWindow {
        let mut window = SampleWindow::default();
        for i in 0..DEFAULT_WINDOW_SIZE {
            window.push(SensorSample::new(i as u64, gravity));
        }
        window
    }

    fn shaky_window() -> SampleWindow {
        // X alternates between -5 and +5, so its variance alone is 25.
        let mut window = SampleWindow::default();
        for i in 0..DEFAULT_WINDOW_SIZE {
            let x = if i % 2 == 0 { -5.0 } else { 5.0 };
            window.push(SensorSample::new(i as u64, Vec3::new(x, 9.5, 0.5)));
        }
        window
    }

    #[test]
    fn test_partial_window_yields_no_decision() {
        let classifier = PostureClassifier::default();
        let mut window = SampleWindow::default();
        for i in 0..(DEFAULT_WINDOW_SIZE - 1) {
            window.push(SensorSample::new(i as u64, Vec3::new(0.0, 9.5, 0.5)));
        }

        let result = classifier.classify(&window, Some(Posture::Standing));
        assert_eq!(result, Classification::no_decision());
        assert!(!result.moving);
    }

    #[test]
    fn test_still_upright_window_is_standing() {
        let classifier = PostureClassifier::default();
        let window = full_window(Vec3::new(0.0, 9.5, 0.5));

        let result = classifier.classify(&window, None);
        assert_eq!(result.posture, Posture::Standing);
        assert!(!result.moving);
    }

    #[test]
    fn test_still_flat_window_is_sitting() {
        // Device lying flat: gravity shows up on Z, Y is near zero.
        let classifier = PostureClassifier::default();
        let window = full_window(Vec3::new(0.3, 0.4, 9.7));

        let result = classifier.classify(&window, None);
        assert_eq!(result.posture, Posture::Sitting);
    }

    #[test]
    fn test_motion_gate_holds_previous_label() {
        let classifier = PostureClassifier::default();
        let window = shaky_window();

        for prior in [Posture::Sitting, Posture::Standing] {
            let result = classifier.classify(&window, Some(prior));
            assert!(result.moving);
            assert_eq!(result.posture, prior, "hysteresis must keep {prior:?}");
        }
    }

    #[test]
    fn test_moving_without_prior_falls_through_to_thresholds() {
        let classifier = PostureClassifier::default();
        let window = shaky_window();

        // mean x is 0, mean y 9.5, mean z 0.5: thresholds say standing even
        // though the window is moving.
        let result = classifier.classify(&window, None);
        assert!(result.moving);
        assert_eq!(result.posture, Posture::Standing);
    }

    #[test]
    fn test_vertical_but_tilted_is_sitting() {
        // Y passes the vertical threshold but Z is too large.
        let classifier = PostureClassifier::default();
        let window = full_window(Vec3::new(0.0, 9.0, 3.5));

        let result = classifier.classify(&window, None);
        assert_eq!(result.posture, Posture::Sitting);
    }

    #[test]
    fn test_legacy_profile_uses_x_axis() {
        let classifier = PostureClassifier::new(ClassifierConfig::legacy_xy());

        // |y| = 4.5 > 4.0 and |x| = 1.0 < 5.0: standing under the legacy
        // pair, sitting under the default one.
        let window = full_window(Vec3::new(1.0, 4.5, 8.0));
        assert_eq!(classifier.classify(&window, None).posture, Posture::Standing);

        let strict = PostureClassifier::default();
        assert_eq!(strict.classify(&window, None).posture, Posture::Sitting);
    }

    #[test]
    fn test_posture_labels() {
        assert_eq!(Posture::Standing.label(), "Stehend");
        assert_eq!(Posture::Sitting.label(), "Sitzend");
    }
}
