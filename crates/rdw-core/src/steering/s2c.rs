//! Steer-to-center (S2C).
//!
//! Continuously bends the user's physical path toward the tracking-space
//! center, choosing per tick between a curvature proposal (while walking)
//! and a rotation-gain proposal (while turning the head) and smoothing
//! whichever wins.

use crate::math::{
    angle_deg, approx_eq, flattened_dir, one_pole, rotate_about_up, signed_angle_deg,
    steering_sign,
};
use crate::steering::{
    Redirector, SteeringContext, CURVATURE_GAIN_CAP, MOVEMENT_THRESHOLD, ROTATION_GAIN_CAP,
    SMOOTHING_FACTOR,
};
use crate::types::{AppliedGain, Correction, Vec3};

/// Bearing to center at which steering direction becomes ill-defined and a
/// temporary off-axis target takes over (degrees).
const TEMP_TARGET_BEARING_THRESHOLD: f32 = 160.0;

/// Bearing below which the proposed rotation is sinusoidally dampened to
/// prevent oscillation around an already-aligned heading (degrees).
const BEARING_DAMPENING_THRESHOLD: f32 = 45.0;

/// Distance below which the proposed rotation is linearly dampened to
/// prevent overshooting the target (m).
const DISTANCE_DAMPENING_THRESHOLD: f32 = 1.25;

/// The steer-to-center strategy.
#[derive(Clone, Debug)]
pub struct SteerToCenter {
    temp_target_distance: f32,
    temporary_target: Option<Vec3>,
    last_rotation_applied: f32,
    applied_gain: AppliedGain,
}

impl SteerToCenter {
    /// Create a fresh S2C strategy.
    #[must_use]
    pub fn new(temp_target_distance: f32) -> Self {
        Self {
            temp_target_distance,
            temporary_target: None,
            last_rotation_applied: 0.0,
            applied_gain: AppliedGain::None,
        }
    }

    /// True while a temporary off-axis target is in use.
    #[must_use]
    pub fn has_temporary_target(&self) -> bool {
        self.temporary_target.is_some()
    }

    /// Pick the steering target: the tracking-space center, or a temporary
    /// off-axis point when the center lies almost directly behind the user.
    fn pick_target(&mut self, curr_pos: Vec3, curr_dir: Vec3, center: Vec3) -> Vec3 {
        let user_to_center = center - curr_pos;
        let bearing_to_center = angle_deg(user_to_center, curr_dir);
        let direction_to_center = signed_angle_deg(curr_dir, user_to_center);

        if bearing_to_center >= TEMP_TARGET_BEARING_THRESHOLD {
            // At ~180 degrees the steering side is undefined; hold a target
            // 90 degrees off to the side the center already leans toward.
            let target = *self.temporary_target.get_or_insert_with(|| {
                let side = if direction_to_center >= 0.0 { 90.0 } else { -90.0 };
                curr_pos + rotate_about_up(curr_dir, side) * self.temp_target_distance
            });
            target
        } else {
            self.temporary_target = None;
            center
        }
    }
}

impl Redirector for SteerToCenter {
    fn on_switch_in(&mut self) {
        self.temporary_target = None;
        self.applied_gain = AppliedGain::None;
    }

    fn compute(&mut self, ctx: &SteeringContext<'_>) -> Correction {
        // Tracking loss or a menu interruption can leave a NaN in the
        // smoothing state; it must not propagate.
        if !self.last_rotation_applied.is_finite() {
            tracing::debug!("s2c smoothing state was non-finite, reset to zero");
            self.last_rotation_applied = 0.0;
        }

        let delta_time = ctx.motion.delta_time;
        if !(delta_time > f32::EPSILON) {
            self.applied_gain = AppliedGain::None;
            return Correction::none();
        }

        let curr_pos = ctx.head.position.flattened();
        let curr_dir = flattened_dir(ctx.head.forward);
        let target = self.pick_target(curr_pos, curr_dir, ctx.center);

        // Curvature proposal: bend the walked path onto the configured arc.
        let mut rotation_from_curvature = 0.0;
        let delta_mag = ctx.motion.delta_pos.magnitude();
        let radius = ctx.gains.curvature_radius();
        if ctx.motion.speed() > MOVEMENT_THRESHOLD && radius > f32::EPSILON {
            rotation_from_curvature =
                (delta_mag / radius).to_degrees().min(CURVATURE_GAIN_CAP * delta_time);
        }

        let desired_facing = target - curr_pos;
        let desired_steering = steering_sign(signed_angle_deg(curr_dir, desired_facing));

        // Rotation-gain proposal: with or against the user's own rotation.
        let mut rotation_from_gain = 0.0;
        let delta_dir = ctx.motion.delta_dir;
        let mut gain_kind = AppliedGain::None;
        if ctx.motion.angular_speed() >= ctx.rotation_threshold {
            let cap = ROTATION_GAIN_CAP * delta_time;
            if delta_dir * desired_steering < 0.0 {
                rotation_from_gain = (delta_dir * ctx.gains.min_rotation_gain()).abs().min(cap);
                gain_kind = AppliedGain::RotationAgainst;
            } else {
                rotation_from_gain = (delta_dir * ctx.gains.max_rotation_gain()).abs().min(cap);
                gain_kind = AppliedGain::RotationWith;
            }
        }

        // One proposal wins outright; they are never combined.
        let curvature_used = rotation_from_curvature > rotation_from_gain;
        let mut rotation_proposed =
            desired_steering * rotation_from_gain.max(rotation_from_curvature);

        // Stationary user: no correction and no smoothing update.
        if approx_eq(rotation_proposed, 0.0) {
            self.applied_gain = AppliedGain::None;
            return Correction::none();
        }

        // Sinusoidal dampening as the bearing approaches zero.
        let bearing_to_target = angle_deg(curr_dir, desired_facing);
        if bearing_to_target <= BEARING_DAMPENING_THRESHOLD {
            rotation_proposed *=
                (90.0 * bearing_to_target / BEARING_DAMPENING_THRESHOLD).to_radians().sin();
        }

        // Linear dampening as the target gets close.
        let distance_to_target = desired_facing.magnitude();
        if distance_to_target <= DISTANCE_DAMPENING_THRESHOLD {
            rotation_proposed *= distance_to_target / DISTANCE_DAMPENING_THRESHOLD;
        }

        let smoothed = one_pole(self.last_rotation_applied, rotation_proposed, SMOOTHING_FACTOR);
        self.last_rotation_applied = smoothed;

        if curvature_used {
            self.applied_gain = AppliedGain::Curvature;
            Correction::Curvature(smoothed)
        } else {
            self.applied_gain = gain_kind;
            Correction::Rotation(smoothed)
        }
    }

    fn last_rotation_applied(&self) -> f32 {
        self.last_rotation_applied
    }

    fn set_last_rotation_applied(&mut self, value: f32) {
        self.last_rotation_applied = value;
    }

    fn applied_gain(&self) -> AppliedGain {
        self.applied_gain
    }
}

// ============================================================================
// Tests
// ============================================================================
