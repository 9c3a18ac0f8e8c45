//! Align-center-to-future (AC2F).
//!
//! Used during distractor episodes to recover the user into the safe area:
//! rotation gains steer the center-to-head vector until it is anti-parallel
//! to the walking direction captured when the episode began, so that walking
//! that direction carries the user back across the tracking-space center.

use crate::math::{
    approx_eq, moving_target_smooth, one_pole, rotate_about_up, signed_angle_deg, steering_sign,
};
use crate::steering::{Redirector, SteeringContext, ROTATION_GAIN_CAP, SMOOTHING_FACTOR};
use crate::types::{AppliedGain, Correction, RotationGainType};

/// The align-center-to-future strategy.
#[derive(Clone, Debug)]
pub struct AlignCenterToFuture {
    transition_speed: f32,
    last_rotation_applied: f32,
    smoothed_rotation: f32,
    transitioning: bool,
    lerp_timer: f32,
    previous_gain_type: RotationGainType,
    aligned: bool,
    applied_gain: AppliedGain,
}

impl AlignCenterToFuture {
    /// Create a fresh AC2F strategy.
    #[must_use]
    pub fn new(transition_speed: f32) -> Self {
        Self {
            transition_speed,
            last_rotation_applied: 0.0,
            smoothed_rotation: 0.0,
            transitioning: false,
            lerp_timer: 0.0,
            previous_gain_type: RotationGainType::None,
            aligned: false,
            applied_gain: AppliedGain::None,
        }
    }

    /// True once alignment has completed this episode.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    /// Zero both rotation gains and smooth the injected rotation toward
    /// natural head rotation instead of cutting it off instantly.
    ///
    /// Called once per episode when alignment is reached; idempotent.
    pub fn disable_gains(&mut self, gains: &mut crate::gains::GainStore) {
        if !self.aligned {
            self.aligned = true;
            gains.zero_rotation_gains();
            self.transitioning = true;
            self.lerp_timer = 0.0;
        }
    }

    /// Begin a transition whenever the desired gain type flips mid-episode,
    /// so the change in injected rotation is interpolated rather than stepped.
    /// Zero proposals are skipped: with gains disabled there is nothing to
    /// transition between.
    fn check_for_gain_change(&mut self, new_gain: RotationGainType, rotation_proposed: f32) {
        if new_gain != RotationGainType::None
            && new_gain != self.previous_gain_type
            && !approx_eq(rotation_proposed, 0.0)
        {
            self.transitioning = true;
            self.lerp_timer = 0.0;
        }
    }
}

impl Redirector for AlignCenterToFuture {
    fn on_switch_in(&mut self) {
        self.previous_gain_type = RotationGainType::None;
        self.aligned = false;
        self.applied_gain = AppliedGain::None;
    }

    fn compute(&mut self, ctx: &SteeringContext<'_>) -> Correction {
        // A menu interruption or tracking loss turns the smoothing state
        // into NaNs; reset before use.
        if !self.smoothed_rotation.is_finite()
            || !self.last_rotation_applied.is_finite()
            || !self.lerp_timer.is_finite()
        {
            tracing::debug!("ac2f smoothing state was non-finite, reset to zero");
            self.smoothed_rotation = 0.0;
            self.last_rotation_applied = 0.0;
            self.lerp_timer = 0.0;
        }

        if self.transitioning && self.lerp_timer >= 1.0 {
            self.transitioning = false;
        }

        let delta_time = ctx.motion.delta_time;
        if !(delta_time > f32::EPSILON) {
            self.applied_gain = AppliedGain::None;
            return Correction::none();
        }

        let delta_dir = ctx.motion.delta_dir;
        let center_to_head = ctx.center_to_head;
        let future = ctx.future_direction;

        // Desired direction to shift the physical space.
        let desired_steering = steering_sign(signed_angle_deg(center_to_head, future));

        let mut rotation_from_gain = 0.0;
        let mut current_gain_type = RotationGainType::None;
        // No captured direction means nothing to align against. That window
        // is reachable when an episode ends while the head is still turning
        // and the swap back to S2C stays parked; the zero proposal lets the
        // smoothed rotation decay instead of steering toward nothing.
        if !future.is_zero() && ctx.motion.angular_speed() >= ctx.rotation_threshold {
            let against_deg = delta_dir * ctx.gains.min_rotation_gain();
            let with_deg = delta_dir * ctx.gains.max_rotation_gain();

            // Apply each candidate hypothetically to the center-to-head
            // vector; the lower dot product means better anti-alignment
            // with the future direction.
            let dot_against = rotate_about_up(center_to_head, against_deg).dot(&future);
            let dot_with = rotate_about_up(center_to_head, with_deg).dot(&future);

            let cap = ROTATION_GAIN_CAP * delta_time;
            if dot_against < dot_with {
                rotation_from_gain = against_deg.abs().min(cap);
                current_gain_type = RotationGainType::Against;
            } else {
                rotation_from_gain = with_deg.abs().min(cap);
                current_gain_type = RotationGainType::With;
            }
        }
        // Below the threshold the proposal is zero and the smoothing drifts
        // back toward natural head rotation. That also covers the small
        // counter-bob at the end of a head movement, which would otherwise
        // end the gain application with a jarring step.

        let rotation_proposed = desired_steering * rotation_from_gain;
        self.check_for_gain_change(current_gain_type, rotation_proposed);

        if self.transitioning {
            self.lerp_timer += delta_time;
            self.smoothed_rotation = moving_target_smooth(
                self.smoothed_rotation,
                self.last_rotation_applied,
                rotation_proposed,
                self.lerp_timer,
                self.transition_speed,
            );
        } else {
            self.smoothed_rotation =
                one_pole(self.last_rotation_applied, rotation_proposed, SMOOTHING_FACTOR);
        }

        self.last_rotation_applied = self.smoothed_rotation;
        self.previous_gain_type = current_gain_type;

        self.applied_gain = if self.aligned {
            AppliedGain::None
        } else {
            match current_gain_type {
                RotationGainType::None => AppliedGain::None,
                RotationGainType::Against => AppliedGain::RotationAgainst,
                RotationGainType::With => AppliedGain::RotationWith,
            }
        };

        Correction::Rotation(self.smoothed_rotation)
    }

    fn last_rotation_applied(&self) -> f32 {
        self.last_rotation_applied
    }

    fn set_last_rotation_applied(&mut self, value: f32) {
        self.last_rotation_applied = value;
        self.smoothed_rotation = value;
    }

    fn applied_gain(&self) -> AppliedGain {
        self.applied_gain
    }
}

// ============================================================================
// Tests
// ============================================================================
