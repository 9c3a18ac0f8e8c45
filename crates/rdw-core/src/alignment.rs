//! Alignment detection during a distractor episode.
//!
//! The episode ends its steering phase once the vector from the
//! tracking-space center to the head points sufficiently opposite the
//! captured future walking direction: walking that direction then carries
//! the user back across the center. Detection is one-shot per episode.

use crate::types::Vec3;

/// One-shot anti-parallelism detector.
#[derive(Clone, Debug)]
pub struct AlignmentDetector {
    threshold: f32,
    armed: bool,
}

impl AlignmentDetector {
    /// Create a detector firing at `dot(center_to_head, future) <= threshold`.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            armed: false,
        }
    }

    /// Arm the detector at episode start.
    pub fn begin_episode(&mut self) {
        self.armed = true;
    }

    /// Disarm without firing, used when an episode ends early.
    pub fn end_episode(&mut self) {
        self.armed = false;
    }

    /// True while the detector is armed and has not fired.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Check this tick's geometry. Fires at most once per episode.
    pub fn check(&mut self, center_to_head: Vec3, future_direction: Vec3) -> bool {
        if !self.armed || future_direction.is_zero() {
            return false;
        }
        if center_to_head.dot(&future_direction) <= self.threshold {
            self.armed = false;
            tracing::debug!("alignment reached");
            return true;
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================
