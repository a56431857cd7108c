use serde::Serialize;

use crate::{timeline::sanitize_seconds, Result, TreeRingError};

/// Seconds each ring takes to grow.
pub const DEFAULT_RING_DURATION_SECONDS: f64 = 2.5;
/// Rings always reported as visible, even before they have grown.
pub const MIN_VISIBLE_RINGS: usize = 3;

/// Maps elapsed play time onto a continuous ring position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthEngine {
    ring_duration: f64,
    ring_count: usize,
}

impl GrowthEngine {
    /// Fails when `ring_duration_seconds` is not a positive finite number or
    /// `ring_count` is zero.
    pub fn new(ring_duration_seconds: f64, ring_count: usize) -> Result<Self> {
        if !ring_duration_seconds.is_finite() || ring_duration_seconds <= 0.0 {
            return Err(TreeRingError::invalid_config(format!(
                "ring duration must be a positive number of seconds, got {ring_duration_seconds}"
            )));
        }
        if ring_count == 0 {
            return Err(TreeRingError::EmptyData);
        }
        Ok(Self {
            ring_duration: ring_duration_seconds,
            ring_count,
        })
    }

    pub fn ring_duration(&self) -> f64 {
        self.ring_duration
    }

    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    /// Index of the last ring; the position never exceeds it.
    pub fn last_ring(&self) -> f64 {
        (self.ring_count - 1) as f64
    }

    /// Growth position after `elapsed_seconds` of play, clamped to
    /// `[0, ring_count - 1]`.
    pub fn sample(&self, elapsed_seconds: f64) -> f64 {
        let raw = sanitize_seconds(elapsed_seconds) / self.ring_duration;
        raw.min(self.last_ring())
    }

    /// Same as [`GrowthEngine::sample`] with the derived ring counts attached.
    pub fn position(&self, elapsed_seconds: f64) -> GrowthPosition {
        GrowthPosition::new(self.sample(elapsed_seconds), self.ring_count)
    }

    /// Play time after which every ring has grown.
    pub fn fully_grown_after(&self) -> f64 {
        self.last_ring() * self.ring_duration
    }
}

/// A growth position with the quantities the renderer reads from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthPosition {
    pub position: f64,
    pub ring_count: usize,
}

impl GrowthPosition {
    pub fn new(position: f64, ring_count: usize) -> Self {
        Self {
            position,
            ring_count,
        }
    }

    /// Ring currently growing.
    pub fn current_ring_index(&self) -> usize {
        self.position.floor() as usize
    }

    /// Fraction of the current ring that has grown, in `[0, 1)`.
    pub fn partial_growth(&self) -> f64 {
        self.position - self.position.floor()
    }

    /// Rings to draw: `max(MIN_VISIBLE_RINGS, current_ring_index + 1)`,
    /// capped at `ring_count`. Series shorter than [`MIN_VISIBLE_RINGS`]
    /// therefore report all of their rings and nothing more, so the floor
    /// only holds when the data set has at least that many rings.
    pub fn visible_ring_count(&self) -> usize {
        (self.current_ring_index() + 1)
            .max(MIN_VISIBLE_RINGS)
            .min(self.ring_count)
    }

    /// Whether the last ring has been reached.
    pub fn is_fully_grown(&self) -> bool {
        self.ring_count > 0 && self.position >= (self.ring_count - 1) as f64
    }
}
