//! Angle and smoothing math shared by both steering strategies.
//!
//! All angles are in degrees. Rotations are about the vertical (Y) axis,
//! which is the only axis the steering core ever injects around.

use nalgebra::{Rotation3, Vector3};

use crate::types::Vec3;

/// Tolerance for "approximately zero" comparisons on proposed rotations.
pub const APPROX_EPSILON: f32 = 1e-6;

/// True when two floats are close enough to be treated as equal.
#[inline]
#[must_use]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= APPROX_EPSILON
}

/// Horizontal projection of `v`, normalized. Degenerate inputs yield zero.
#[inline]
#[must_use]
pub fn flattened_dir(v: Vec3) -> Vec3 {
    v.flattened().normalized()
}

/// Unsigned angle between two vectors in degrees, in [0, 180].
#[must_use]
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = a.magnitude() * b.magnitude();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    let cos = (a.dot(&b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Signed angle from `from` to `to` about the vertical axis, in degrees.
///
/// Positive means `to` lies counter-clockwise of `from` when viewed from
/// above, matching [`rotate_about_up`]:
/// `rotate_about_up(from, signed_angle_deg(from, to))` points along `to`.
#[must_use]
pub fn signed_angle_deg(from: Vec3, to: Vec3) -> f32 {
    let cross_y = from.z * to.x - from.x * to.z;
    let dot = from.x * to.x + from.z * to.z;
    cross_y.atan2(dot).to_degrees()
}

/// Rotate `v` about the vertical axis by `angle_deg` degrees.
#[must_use]
pub fn rotate_about_up(v: Vec3, angle_deg: f32) -> Vec3 {
    let rot = Rotation3::from_axis_angle(&Vector3::y_axis(), angle_deg.to_radians());
    Vec3::from_vector3(&(rot * v.to_vector3()))
}

/// Sign of the desired steering direction for a signed bearing.
///
/// The injected rotation must oppose the bearing so that the user, in
/// countering it, turns toward the target.
#[inline]
#[must_use]
pub fn steering_sign(signed_bearing_deg: f32) -> f32 {
    if signed_bearing_deg >= 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// One-pole exponential smoothing: `(1-α)·last + α·proposed`.
#[inline]
#[must_use]
pub fn one_pole(last: f32, proposed: f32, alpha: f32) -> f32 {
    (1.0 - alpha) * last + alpha * proposed
}

/// Smoothing toward a moving target, used while transitioning between gain
/// types. Unlike [`one_pole`], this converges onto the new proposal without
/// a visible step at the moment the desired direction flips.
///
/// `t` is the elapsed transition time and `speed` the configured transition
/// speed; the pair parameterizes how quickly the follower locks on.
#[must_use]
pub fn moving_target_smooth(
    follower_old: f32,
    target_old: f32,
    target_new: f32,
    t: f32,
    speed: f32,
) -> f32 {
    let st = speed * t;
    if st <= f32::EPSILON {
        return follower_old;
    }
    let f = follower_old - target_old + (target_new - target_old) / st;
    target_new - (target_new - target_old) / st + f * (-st).exp()
}

// ============================================================================
// Tests
// ============================================================================
