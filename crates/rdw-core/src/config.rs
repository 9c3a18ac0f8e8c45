//! Runtime configuration for the steering core.
//!
//! Malformed configuration is the only fatal condition in this crate; it is
//! rejected up front by [`RedirectionConfig::validate`] rather than surfacing
//! as NaNs somewhere in the per-tick math.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Configuration validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A numeric field was NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Offending field name
        field: &'static str,
        /// The value that was supplied
        value: f32,
    },
    /// A field fell outside its valid range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Offending field name
        field: &'static str,
        /// The value that was supplied
        value: f32,
        /// Lower bound (inclusive)
        min: f32,
        /// Upper bound (inclusive)
        max: f32,
    },
    /// A field must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Offending field name
        field: &'static str,
        /// The value that was supplied
        value: f32,
    },
    /// The position sample rate must be non-zero.
    #[error("position_samples_per_second must be non-zero")]
    ZeroSampleRate,
    /// The distractor pool must hold at least one entry.
    #[error("distractor_pool_size must be non-zero")]
    EmptyDistractorPool,
    /// The fixed debug distractor index points outside the pool.
    #[error("debug_distractor index {index} is outside the pool of {pool_size}")]
    DebugDistractorOutOfRange {
        /// Requested index
        index: usize,
        /// Configured pool size
        pool_size: usize,
    },
}

// ============================================================================
// Configuration
// ============================================================================

/// All recognized configuration options of the steering core.
///
/// The three gain values are runtime-mutable through the gain store; the rest
/// is fixed once the manager is constructed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectionConfig {
    /// Rotation gain applied against the user's own rotation. Negative:
    /// the virtual world turns slower than the head.
    pub min_rotation_gain: f32,
    /// Rotation gain applied with the user's own rotation. Positive:
    /// the virtual world turns faster than the head.
    pub max_rotation_gain: f32,
    /// Radius of the arc that curvature gain bends a straight walk onto (m).
    pub curvature_radius: f32,
    /// Head rotations below this angular speed receive no rotation gain
    /// (degrees per second). Also the settling threshold for deferred
    /// algorithm swaps.
    pub rotation_threshold: f32,
    /// Dot-product cutoff below which center-to-head and the future
    /// direction count as anti-parallel. Range [-1, 0].
    pub alignment_threshold: f32,
    /// How often a head translation sample enters the ring buffer (Hz).
    /// The buffer holds one second of samples.
    pub position_samples_per_second: u32,
    /// Minimum tick time between the end of one distractor episode and the
    /// next trigger (s).
    pub distractor_cooldown: f32,
    /// When false, AC2F is never engaged and S2C runs continuously.
    pub switch_to_ac2f_enabled: bool,
    /// Distance at which S2C places its temporary off-axis target (m).
    pub temp_target_distance: f32,
    /// Speed parameter of the moving-target smoothing used while AC2F
    /// transitions between gain types.
    pub transition_speed: f32,
    /// Number of distinct distractors available for selection.
    pub distractor_pool_size: usize,
    /// Fixed distractor index overriding the shuffled bag; debugging aid.
    pub debug_distractor: Option<usize>,
    /// Seed for the distractor shuffle. `None` seeds from entropy.
    pub distractor_seed: Option<u64>,
}

impl Default for RedirectionConfig {
    fn default() -> Self {
        Self {
            min_rotation_gain: -0.33,
            max_rotation_gain: 0.49,
            curvature_radius: 7.5,
            rotation_threshold: 12.5,
            alignment_threshold: -0.9,
            position_samples_per_second: 60,
            distractor_cooldown: 10.0,
            switch_to_ac2f_enabled: true,
            temp_target_distance: 4.0,
            transition_speed: 0.5,
            distractor_pool_size: 4,
            debug_distractor: None,
            distractor_seed: None,
        }
    }
}

impl RedirectionConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite_fields = [
            ("min_rotation_gain", self.min_rotation_gain),
            ("max_rotation_gain", self.max_rotation_gain),
            ("curvature_radius", self.curvature_radius),
            ("rotation_threshold", self.rotation_threshold),
            ("alignment_threshold", self.alignment_threshold),
            ("distractor_cooldown", self.distractor_cooldown),
            ("temp_target_distance", self.temp_target_distance),
            ("transition_speed", self.transition_speed),
        ];
        for (field, value) in finite_fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        if !(-1.0..=0.0).contains(&self.alignment_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "alignment_threshold",
                value: self.alignment_threshold,
                min: -1.0,
                max: 0.0,
            });
        }

        let positive_fields = [
            ("curvature_radius", self.curvature_radius),
            ("temp_target_distance", self.temp_target_distance),
            ("transition_speed", self.transition_speed),
        ];
        for (field, value) in positive_fields {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.rotation_threshold < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "rotation_threshold",
                value: self.rotation_threshold,
            });
        }
        if self.distractor_cooldown < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "distractor_cooldown",
                value: self.distractor_cooldown,
            });
        }

        if self.position_samples_per_second == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.distractor_pool_size == 0 {
            return Err(ConfigError::EmptyDistractorPool);
        }
        if let Some(index) = self.debug_distractor {
            if index >= self.distractor_pool_size {
                return Err(ConfigError::DebugDistractorOutOfRange {
                    index,
                    pool_size: self.distractor_pool_size,
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RedirectionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_alignment_threshold_range() {
        let mut config = RedirectionConfig::default();
        config.alignment_threshold = -1.0;
        assert!(config.validate().is_ok());
        config.alignment_threshold = 0.0;
        assert!(config.validate().is_ok());

        config.alignment_threshold = 0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
        config.alignment_threshold = -1.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_non_finite_gain_rejected() {
        let mut config = RedirectionConfig::default();
        config.max_rotation_gain = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "max_rotation_gain", .. })
        ));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let mut config = RedirectionConfig::default();
        config.position_samples_per_second = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSampleRate));
    }

    #[test]
    fn test_curvature_radius_must_be_positive() {
        let mut config = RedirectionConfig::default();
        config.curvature_radius = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "curvature_radius", .. })
        ));
    }

    #[test]
    fn test_debug_distractor_bounds() {
        let mut config = RedirectionConfig::default();
        config.distractor_pool_size = 3;
        config.debug_distractor = Some(2);
        assert!(config.validate().is_ok());

        config.debug_distractor = Some(3);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DebugDistractorOutOfRange { index: 3, pool_size: 3 })
        );
    }
}
