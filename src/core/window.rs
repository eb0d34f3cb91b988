//! Bounded sample window for classification statistics.
//!
//! The window keeps the most recent samples in arrival order and computes
//! per-axis gravity statistics on demand. Statistics are only meaningful
//! over a full window; callers get `None` until enough samples arrived.

use crate::collector::types::SensorSample;
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Default number of samples the classification window holds.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Gravity axis selector for window statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A fixed-capacity FIFO of the most recent sensor samples.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<SensorSample>,
    capacity: usize,
}

impl SampleWindow {
    /// Create an empty window holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one once at capacity.
    pub fn push(&mut self, sample: SensorSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Drop all held samples. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether enough samples are held to compute statistics.
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Arithmetic mean of one gravity axis over the window.
    ///
    /// `None` until the window is full.
    pub fn mean(&self, axis: Axis) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.axis_values(axis).mean())
    }

    /// Population variance of one gravity axis over the window.
    ///
    /// `None` until the window is full.
    pub fn variance(&self, axis: Axis) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.axis_values(axis).population_variance())
    }

    fn axis_values(&self, axis: Axis) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(move |s| match axis {
            Axis::X => s.gravity.x,
            Axis::Y => s.gravity.y,
            Axis::Z => s.gravity.z,
        })
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
