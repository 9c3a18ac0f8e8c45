//! The mutable gain store shared by both steering strategies.
//!
//! Holds the three runtime-tunable scalars (rotation gain against, rotation
//! gain with, curvature radius) together with their baseline copies. The
//! baseline doubles as the startup values and as the restore point captured
//! when a distractor episode begins.

use serde::{Deserialize, Serialize};

use crate::config::RedirectionConfig;

/// Rotation and curvature gains, plus their restore baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GainStore {
    min_rotation_gain: f32,
    max_rotation_gain: f32,
    curvature_radius: f32,
    base_min_rotation_gain: f32,
    base_max_rotation_gain: f32,
    base_curvature_radius: f32,
}

impl GainStore {
    /// Create a store from validated configuration.
    #[must_use]
    pub fn new(config: &RedirectionConfig) -> Self {
        Self {
            min_rotation_gain: config.min_rotation_gain,
            max_rotation_gain: config.max_rotation_gain,
            curvature_radius: config.curvature_radius,
            base_min_rotation_gain: config.min_rotation_gain,
            base_max_rotation_gain: config.max_rotation_gain,
            base_curvature_radius: config.curvature_radius,
        }
    }

    /// Rotation gain applied against the user's own rotation.
    #[inline]
    #[must_use]
    pub fn min_rotation_gain(&self) -> f32 {
        self.min_rotation_gain
    }

    /// Rotation gain applied with the user's own rotation.
    #[inline]
    #[must_use]
    pub fn max_rotation_gain(&self) -> f32 {
        self.max_rotation_gain
    }

    /// Curvature radius in meters.
    #[inline]
    #[must_use]
    pub fn curvature_radius(&self) -> f32 {
        self.curvature_radius
    }

    /// Overwrite the current rotation gains.
    pub fn set_rotation_gains(&mut self, min: f32, max: f32) {
        self.min_rotation_gain = min;
        self.max_rotation_gain = max;
    }

    /// Overwrite the current curvature radius.
    pub fn set_curvature_radius(&mut self, radius: f32) {
        self.curvature_radius = radius;
    }

    /// Zero both rotation gains. Curvature is left untouched.
    pub fn zero_rotation_gains(&mut self) {
        self.min_rotation_gain = 0.0;
        self.max_rotation_gain = 0.0;
    }

    /// Cache the current values as the restore baseline.
    pub fn capture_baseline(&mut self) {
        self.base_min_rotation_gain = self.min_rotation_gain;
        self.base_max_rotation_gain = self.max_rotation_gain;
        self.base_curvature_radius = self.curvature_radius;
    }

    /// Restore the values cached by the last [`capture_baseline`](Self::capture_baseline).
    pub fn restore_baseline(&mut self) {
        self.min_rotation_gain = self.base_min_rotation_gain;
        self.max_rotation_gain = self.base_max_rotation_gain;
        self.curvature_radius = self.base_curvature_radius;
    }

    /// The baseline rotation gains, `(min, max)`.
    #[must_use]
    pub fn baseline_rotation_gains(&self) -> (f32, f32) {
        (self.base_min_rotation_gain, self.base_max_rotation_gain)
    }

    /// Reset corrupted (non-finite) values to zero.
    ///
    /// Called once per tick before the gains are applied, so a NaN picked up
    /// through tracking loss or an external write never propagates into the
    /// injected rotation.
    pub fn sanitize(&mut self) {
        for value in [
            &mut self.min_rotation_gain,
            &mut self.max_rotation_gain,
            &mut self.curvature_radius,
            &mut self.base_min_rotation_gain,
            &mut self.base_max_rotation_gain,
            &mut self.base_curvature_radius,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
