//! The two interchangeable steering strategies.
//!
//! Both strategies consume the same per-tick [`SteeringContext`] and emit a
//! [`Correction`]; the manager selects between them through the
//! [`ActiveAlgorithm`](crate::types::ActiveAlgorithm) tag rather than through
//! dynamic dispatch.

mod ac2f;
mod s2c;

pub use ac2f::AlignCenterToFuture;
pub use s2c::SteerToCenter;

use crate::gains::GainStore;
use crate::types::{AppliedGain, Correction, HeadPose, MotionSample, Vec3};

// ============================================================================
// Shared steering constants
// ============================================================================

/// Translational speed below which curvature gain stays off (m/s).
pub const MOVEMENT_THRESHOLD: f32 = 0.2;

/// Hard cap on injected rotation from rotation gains (degrees per second).
pub const ROTATION_GAIN_CAP: f32 = 30.0;

/// Hard cap on injected rotation from curvature gain (degrees per second).
pub const CURVATURE_GAIN_CAP: f32 = 15.0;

/// Coefficient of the one-pole smoothing applied to every correction.
pub const SMOOTHING_FACTOR: f32 = 0.125;

// ============================================================================
// Steering seam
// ============================================================================

/// Read-only view of the per-tick state a steering strategy consumes.
#[derive(Clone, Copy, Debug)]
pub struct SteeringContext<'a> {
    /// Head motion since the previous tick.
    pub motion: &'a MotionSample,
    /// Current head pose.
    pub head: &'a HeadPose,
    /// Center of the physical tracking space, flattened.
    pub center: Vec3,
    /// Unit vector from the tracking-space center to the head, flattened.
    pub center_to_head: Vec3,
    /// Captured future walking direction; zero outside an episode.
    pub future_direction: Vec3,
    /// Shared gain store.
    pub gains: &'a GainStore,
    /// Angular speed below which rotation gains stay off (deg/s).
    pub rotation_threshold: f32,
}

/// A steering strategy: one correction per tick.
pub trait Redirector {
    /// Re-initialize episode-local state when this strategy becomes active.
    fn on_switch_in(&mut self);

    /// Compute the correction to inject this tick.
    fn compute(&mut self, ctx: &SteeringContext<'_>) -> Correction;

    /// The smoothed rotation carried between ticks.
    fn last_rotation_applied(&self) -> f32;

    /// Seed the smoothing state, used to hand the signal over across an
    /// algorithm swap without a discontinuity.
    fn set_last_rotation_applied(&mut self, value: f32);

    /// Which gain kind the last [`compute`](Self::compute) applied.
    fn applied_gain(&self) -> AppliedGain;
}
