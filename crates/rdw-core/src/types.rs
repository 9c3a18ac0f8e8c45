//! Core data types for the redirected-walking steering core.
//!
//! All geometry lives on the horizontal (XZ) plane with Y up; vertical
//! components are flattened away before any steering math runs.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A 3D vector in meters, Y up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component (m)
    pub x: f32,
    /// Y component (m)
    pub y: f32,
    /// Z component (m)
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Get the magnitude of the vector.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Normalize to a unit vector. Degenerate inputs yield zero.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag > 1e-8 {
            Self::new(self.x / mag, self.y / mag, self.z / mag)
        } else {
            Self::zero()
        }
    }

    /// Dot product with another vector.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Project onto the horizontal plane (zero the Y component).
    #[must_use]
    pub const fn flattened(&self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// True when all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// True when the vector is (approximately) zero length.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.magnitude() <= 1e-8
    }

    /// Convert to nalgebra `Vector3`.
    #[must_use]
    pub fn to_vector3(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Create from nalgebra `Vector3`.
    #[must_use]
    pub fn from_vector3(v: &Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl core::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl core::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl core::ops::Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl core::ops::Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Per-tick head motion supplied by the host tracking loop.
///
/// Consumed each tick and never stored beyond it, except for `delta_pos`
/// inside the position sample buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Head translation since the previous tick (m).
    pub delta_pos: Vec3,
    /// Head yaw change since the previous tick (degrees, positive = left).
    pub delta_dir: f32,
    /// Elapsed time since the previous tick (s).
    pub delta_time: f32,
}

impl MotionSample {
    /// Create a new motion sample.
    #[must_use]
    pub const fn new(delta_pos: Vec3, delta_dir: f32, delta_time: f32) -> Self {
        Self {
            delta_pos,
            delta_dir,
            delta_time,
        }
    }

    /// Translational speed in m/s. Zero when `delta_time` is degenerate.
    #[must_use]
    pub fn speed(&self) -> f32 {
        if self.delta_time > f32::EPSILON {
            self.delta_pos.magnitude() / self.delta_time
        } else {
            0.0
        }
    }

    /// Angular speed in degrees per second. Zero when `delta_time` is degenerate.
    #[must_use]
    pub fn angular_speed(&self) -> f32 {
        if self.delta_time > f32::EPSILON {
            self.delta_dir.abs() / self.delta_time
        } else {
            0.0
        }
    }
}

/// Head position and facing direction in tracking-space coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Head position (m).
    pub position: Vec3,
    /// Head forward vector; only its horizontal projection is used.
    pub forward: Vec3,
}

impl HeadPose {
    /// Create a new head pose.
    #[must_use]
    pub const fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }
}

/// Everything the core consumes on a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Head motion since the previous tick.
    pub motion: MotionSample,
    /// Current head pose.
    pub head: HeadPose,
    /// Center of the physical tracking space.
    pub center: Vec3,
    /// True while a boundary reset is in progress; the core must emit
    /// zero correction for the duration.
    pub in_reset: bool,
}

/// The correction injected into the physical/virtual mapping this tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Correction {
    /// Extra yaw injected on top of the user's own rotation (degrees).
    Rotation(f32),
    /// Yaw injected proportionally to translation, bending the walked
    /// path onto an arc (degrees).
    Curvature(f32),
}

impl Correction {
    /// The zero correction.
    #[must_use]
    pub const fn none() -> Self {
        Self::Rotation(0.0)
    }

    /// The injected angle in degrees, whichever kind it is.
    #[must_use]
    pub const fn value(&self) -> f32 {
        match self {
            Self::Rotation(v) | Self::Curvature(v) => *v,
        }
    }

    /// True when no rotation is injected this tick.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.value().abs() <= f32::EPSILON
    }
}

impl Default for Correction {
    fn default() -> Self {
        Self::none()
    }
}

/// Which kind of rotation gain a redirector picked for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationGainType {
    /// No rotation gain applied.
    #[default]
    None,
    /// Scaling down the user's own rotation (`min_rotation_gain`).
    Against,
    /// Scaling up the user's own rotation (`max_rotation_gain`).
    With,
}

/// The gain kind actually applied this tick, for experiment logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppliedGain {
    /// Nothing was injected.
    #[default]
    None,
    /// Rotation gain against the user's own head rotation.
    RotationAgainst,
    /// Rotation gain with the user's own head rotation.
    RotationWith,
    /// Curvature gain proportional to translation.
    Curvature,
}

/// The steering strategy currently in charge of corrections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveAlgorithm {
    /// Steer-to-center: continuously steer the user's heading toward the
    /// tracking-space center.
    #[default]
    S2c,
    /// Align-center-to-future: steer the center-to-head vector against a
    /// captured future walking direction.
    Ac2f,
}

// ============================================================================
// Tests
// ============================================================================
