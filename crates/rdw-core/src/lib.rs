//! RDW Core - Gain steering for redirected walking
//!
//! This crate is the steering core of a redirected-walking engine. Given the
//! user's per-frame physical head translation and rotation, it computes a
//! small, imperceptible yaw (or path-curvature) correction to inject into the
//! mapping between physical and virtual space, so a user confined to a small
//! tracking area can walk indefinitely in a larger virtual world.
//!
//! # Modules
//!
//! - [`types`]: Core data types (vectors, motion samples, corrections)
//! - [`math`]: Angle/rotation helpers and the smoothing primitives
//! - [`config`]: Runtime configuration and validation
//! - [`gains`]: The shared rotation/curvature gain store
//! - [`sampling`]: Position sample ring buffer and direction estimate
//! - [`steering`]: The two steering strategies (S2C and AC2F)
//! - [`coordinator`]: Deferred swapping between steering strategies
//! - [`alignment`]: Convergence detection for distractor episodes
//! - [`distractor`]: Trigger gating and distractor selection
//! - [`manager`]: The per-tick entry point tying everything together
//!
//! # Example
//!
//! ```rust
//! use rdw_core::config::RedirectionConfig;
//! use rdw_core::manager::RedirectionManager;
//! use rdw_core::types::{HeadPose, MotionSample, TickInput, Vec3};
//!
//! let mut manager = RedirectionManager::new(RedirectionConfig::default()).unwrap();
//!
//! // Called once per rendered frame by the host tracking loop.
//! let input = TickInput {
//!     motion: MotionSample::new(Vec3::new(0.0, 0.0, 0.02), 0.5, 1.0 / 90.0),
//!     head: HeadPose::new(Vec3::new(1.0, 1.7, 0.5), Vec3::new(0.0, 0.0, 1.0)),
//!     center: Vec3::zero(),
//!     in_reset: false,
//! };
//! let correction = manager.tick(&input);
//! assert!(correction.value().is_finite());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod alignment;
pub mod config;
pub mod coordinator;
pub mod distractor;
pub mod gains;
pub mod manager;
pub mod math;
pub mod sampling;
pub mod steering;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{ConfigError, RedirectionConfig};
pub use gains::GainStore;
pub use manager::RedirectionManager;
pub use types::{
    ActiveAlgorithm, AppliedGain, Correction, HeadPose, MotionSample, RotationGainType,
    TickInput, Vec3,
};
