//! The per-tick entry point tying the steering core together.
//!
//! The host tracking loop owns the clock: it calls [`RedirectionManager::tick`]
//! once per rendered frame with that frame's head motion, and receives the
//! correction to inject into the physical-to-virtual mapping. Distractor
//! episodes are driven by the host too, through
//! [`on_distractor_trigger`](RedirectionManager::on_distractor_trigger) and
//! [`on_distractor_end`](RedirectionManager::on_distractor_end).

use crate::alignment::AlignmentDetector;
use crate::config::{ConfigError, RedirectionConfig};
use crate::coordinator::SwitchCoordinator;
use crate::distractor::DistractorGate;
use crate::gains::GainStore;
use crate::math::flattened_dir;
use crate::sampling::PositionSampleBuffer;
use crate::steering::{AlignCenterToFuture, Redirector, SteerToCenter, SteeringContext};
use crate::types::{ActiveAlgorithm, AppliedGain, Correction, TickInput, Vec3};

type Callback = Box<dyn FnMut() + Send>;

/// The steering core. One instance per tracked user.
pub struct RedirectionManager {
    config: RedirectionConfig,
    gains: GainStore,
    buffer: PositionSampleBuffer,
    coordinator: SwitchCoordinator,
    gate: DistractorGate,
    detector: AlignmentDetector,
    s2c: SteerToCenter,
    ac2f: AlignCenterToFuture,
    future_direction: Vec3,
    last_applied_gain: AppliedGain,
    paused: bool,
    on_aligned: Vec<Callback>,
    on_triggered: Vec<Callback>,
    on_ended: Vec<Callback>,
}

impl RedirectionManager {
    /// Build a manager from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is invalid.
    pub fn new(config: RedirectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            min_gain = config.min_rotation_gain,
            max_gain = config.max_rotation_gain,
            curvature_radius = config.curvature_radius,
            "redirection manager initialized"
        );
        Ok(Self {
            gains: GainStore::new(&config),
            buffer: PositionSampleBuffer::new(config.position_samples_per_second),
            coordinator: SwitchCoordinator::new(ActiveAlgorithm::S2c, config.rotation_threshold),
            gate: DistractorGate::new(&config),
            detector: AlignmentDetector::new(config.alignment_threshold),
            s2c: SteerToCenter::new(config.temp_target_distance),
            ac2f: AlignCenterToFuture::new(config.transition_speed),
            future_direction: Vec3::zero(),
            last_applied_gain: AppliedGain::None,
            paused: false,
            on_aligned: Vec::new(),
            on_triggered: Vec::new(),
            on_ended: Vec::new(),
            config,
        })
    }

    /// Advance the core by one frame and compute the correction to inject.
    ///
    /// Always finite; zero while paused or during a boundary reset. A paused
    /// core mutates nothing, so samples gathered before the pause stay valid.
    pub fn tick(&mut self, input: &TickInput) -> Correction {
        if self.paused {
            self.last_applied_gain = AppliedGain::None;
            return Correction::none();
        }

        self.gains.sanitize();
        self.buffer
            .accumulate(input.motion.delta_pos, input.motion.delta_time);
        self.gate.tick(input.motion.delta_time);

        let center = input.center.flattened();
        let center_to_head = flattened_dir(input.head.position - input.center);

        let correction = if input.in_reset {
            self.last_applied_gain = AppliedGain::None;
            Correction::none()
        } else {
            let ctx = SteeringContext {
                motion: &input.motion,
                head: &input.head,
                center,
                center_to_head,
                future_direction: self.future_direction,
                gains: &self.gains,
                rotation_threshold: self.config.rotation_threshold,
            };
            let correction = match self.coordinator.active() {
                ActiveAlgorithm::S2c => self.s2c.compute(&ctx),
                ActiveAlgorithm::Ac2f => self.ac2f.compute(&ctx),
            };
            // Captured before the swap poll so it names the strategy that
            // actually produced this tick's correction.
            self.last_applied_gain = match self.coordinator.active() {
                ActiveAlgorithm::S2c => self.s2c.applied_gain(),
                ActiveAlgorithm::Ac2f => self.ac2f.applied_gain(),
            };
            correction
        };

        if let Some(next) = self.coordinator.poll(input.motion.angular_speed()) {
            // Hand the smoothed rotation over so the injected signal stays
            // continuous across the swap.
            match next {
                ActiveAlgorithm::Ac2f => {
                    let carried = self.s2c.last_rotation_applied();
                    self.ac2f.on_switch_in();
                    self.ac2f.set_last_rotation_applied(carried);
                }
                ActiveAlgorithm::S2c => {
                    let carried = self.ac2f.last_rotation_applied();
                    self.s2c.on_switch_in();
                    self.s2c.set_last_rotation_applied(carried);
                }
            }
        }

        if !input.in_reset
            && self.gate.is_active()
            && self.detector.check(center_to_head, self.future_direction)
        {
            self.ac2f.disable_gains(&mut self.gains);
            for callback in &mut self.on_aligned {
                callback();
            }
        }

        correction
    }

    /// Begin a distractor episode, returning the selected distractor index.
    ///
    /// Declines (returns `None`) while another episode runs, during cooldown,
    /// while the feature is disabled, or when no walking direction can be
    /// estimated yet.
    pub fn on_distractor_trigger(&mut self) -> Option<usize> {
        if !self.gate.can_trigger() {
            tracing::debug!("distractor trigger declined by gate");
            return None;
        }
        let future = self.buffer.average_direction();
        if future.is_zero() {
            tracing::debug!("distractor trigger declined, no walking direction yet");
            return None;
        }

        self.future_direction = future;
        self.gains.capture_baseline();
        self.detector.begin_episode();
        let index = self.gate.begin();
        if self.config.switch_to_ac2f_enabled {
            self.coordinator.request_switch(ActiveAlgorithm::Ac2f);
        }
        for callback in &mut self.on_triggered {
            callback();
        }
        Some(index)
    }

    /// End the running distractor episode.
    ///
    /// Restores the gains captured at trigger time, whether or not alignment
    /// completed, and requests the switch back to steer-to-center. No-op when
    /// no episode is running.
    pub fn on_distractor_end(&mut self) {
        if !self.gate.is_active() {
            return;
        }
        self.gate.end();
        self.gains.restore_baseline();
        self.detector.end_episode();
        self.future_direction = Vec3::zero();
        self.coordinator.request_switch(ActiveAlgorithm::S2c);
        for callback in &mut self.on_ended {
            callback();
        }
        tracing::debug!("distractor episode ended");
    }

    /// Re-apply the configured rotation gains and curvature radius.
    pub fn activate_gains(&mut self) {
        self.gains.set_rotation_gains(
            self.config.min_rotation_gain,
            self.config.max_rotation_gain,
        );
        self.gains.set_curvature_radius(self.config.curvature_radius);
    }

    /// Enable or disable distractor usage. Disabling force-ends a running
    /// episode first.
    pub fn set_distractor_usage_enabled(&mut self, enabled: bool) {
        if !enabled && self.gate.is_active() {
            self.on_distractor_end();
        }
        self.gate.set_enabled(enabled);
    }

    /// Pause or resume the core. Paused ticks emit zero correction and
    /// advance neither the sample buffer nor the cooldown clock.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// True while correction output is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The steering strategy currently in charge.
    #[must_use]
    pub fn active_algorithm(&self) -> ActiveAlgorithm {
        self.coordinator.active()
    }

    /// The gain kind applied on the last tick. [`AppliedGain::None`] while
    /// paused or during a boundary reset, since no correction is injected.
    #[must_use]
    pub fn applied_gain(&self) -> AppliedGain {
        self.last_applied_gain
    }

    /// True while a distractor episode is running.
    #[must_use]
    pub fn is_distractor_active(&self) -> bool {
        self.gate.is_active()
    }

    /// The walking direction captured at trigger time; zero outside episodes.
    #[must_use]
    pub fn future_direction(&self) -> Vec3 {
        self.future_direction
    }

    /// Shared gain store, read-only.
    #[must_use]
    pub fn gains(&self) -> &GainStore {
        &self.gains
    }

    /// Shared gain store, mutable. Writes take effect next tick.
    pub fn gains_mut(&mut self) -> &mut GainStore {
        &mut self.gains
    }

    /// Run `callback` whenever alignment completes.
    pub fn subscribe_aligned(&mut self, callback: Callback) {
        self.on_aligned.push(callback);
    }

    /// Run `callback` whenever a distractor episode begins.
    pub fn subscribe_triggered(&mut self, callback: Callback) {
        self.on_triggered.push(callback);
    }

    /// Run `callback` whenever a distractor episode ends.
    pub fn subscribe_ended(&mut self, callback: Callback) {
        self.on_ended.push(callback);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeadPose, MotionSample};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    fn manager() -> RedirectionManager {
        let config = RedirectionConfig {
            distractor_seed: Some(42),
            ..RedirectionConfig::default()
        };
        RedirectionManager::new(config).unwrap()
    }

    fn walk_tick(z: f32) -> TickInput {
        TickInput {
            motion: MotionSample::new(Vec3::new(0.0, 0.0, DT), 0.0, DT),
            head: HeadPose::new(Vec3::new(0.0, 1.7, z), Vec3::new(0.0, 0.0, 1.0)),
            center: Vec3::zero(),
            in_reset: false,
        }
    }

    /// Walk straight along +Z for one second to fill the sample buffer.
    fn fill_buffer(manager: &mut RedirectionManager) {
        for i in 0..60 {
            manager.tick(&walk_tick(i as f32 * DT));
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RedirectionConfig {
            curvature_radius: -1.0,
            ..RedirectionConfig::default()
        };
        assert!(RedirectionManager::new(config).is_err());
    }

    #[test]
    fn test_episode_captures_walking_direction_and_restores_gains() {
        let mut manager = manager();
        fill_buffer(&mut manager);

        assert!(manager.on_distractor_trigger().is_some());
        let future = manager.future_direction();
        assert!((future - Vec3::new(0.0, 0.0, 1.0)).magnitude() < 1e-5);

        // Gains mutated mid-episode must snap back to trigger-time values.
        manager.gains_mut().set_rotation_gains(-0.9, 0.9);
        manager.on_distractor_end();
        assert!((manager.gains().min_rotation_gain() + 0.33).abs() < 1e-6);
        assert!((manager.gains().max_rotation_gain() - 0.49).abs() < 1e-6);
        assert!(manager.future_direction().is_zero());
        assert!(!manager.is_distractor_active());
    }

    #[test]
    fn test_trigger_declined_without_walking_history() {
        let mut manager = manager();
        assert_eq!(manager.on_distractor_trigger(), None);
        assert!(!manager.is_distractor_active());
    }

    #[test]
    fn test_trigger_declined_while_episode_active() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        assert!(manager.on_distractor_trigger().is_some());
        assert_eq!(manager.on_distractor_trigger(), None);
    }

    #[test]
    fn test_cooldown_blocks_back_to_back_episodes() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        assert!(manager.on_distractor_trigger().is_some());
        manager.on_distractor_end();
        // Cooldown just started; an immediate re-trigger must decline.
        assert_eq!(manager.on_distractor_trigger(), None);
    }

    #[test]
    fn test_switch_defers_until_head_is_quiet() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        assert!(manager.on_distractor_trigger().is_some());
        assert_eq!(manager.active_algorithm(), ActiveAlgorithm::S2c);

        // 100 ticks of fast head rotation keep the swap parked.
        for _ in 0..100 {
            let input = TickInput {
                motion: MotionSample::new(Vec3::zero(), 40.0 * DT, DT),
                head: HeadPose::new(Vec3::new(0.0, 1.7, 1.0), Vec3::new(0.0, 0.0, 1.0)),
                center: Vec3::zero(),
                in_reset: false,
            };
            manager.tick(&input);
            assert_eq!(manager.active_algorithm(), ActiveAlgorithm::S2c);
        }

        manager.tick(&walk_tick(1.0));
        assert_eq!(manager.active_algorithm(), ActiveAlgorithm::Ac2f);
    }

    #[test]
    fn test_paused_manager_accumulates_nothing() {
        let mut manager = manager();
        manager.set_paused(true);
        fill_buffer(&mut manager);
        manager.set_paused(false);
        // A full second of paused walking left no samples behind.
        assert_eq!(manager.on_distractor_trigger(), None);
    }

    #[test]
    fn test_paused_manager_emits_zero() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        manager.set_paused(true);

        let input = TickInput {
            motion: MotionSample::new(Vec3::new(0.0, 0.0, DT), 20.0 * DT, DT),
            head: HeadPose::new(Vec3::new(2.0, 1.7, 0.0), Vec3::new(0.0, 0.0, 1.0)),
            center: Vec3::zero(),
            in_reset: false,
        };
        assert!(manager.tick(&input).is_none());

        manager.set_paused(false);
        assert!(!manager.tick(&input).is_none());
    }

    #[test]
    fn test_reset_suppresses_correction() {
        let mut manager = manager();
        let mut input = walk_tick(0.0);
        input.head.position = Vec3::new(2.0, 1.7, 0.0);
        input.in_reset = true;
        assert!(manager.tick(&input).is_none());
    }

    #[test]
    fn test_ended_episode_injects_nothing_while_swap_is_parked() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        assert!(manager.on_distractor_trigger().is_some());
        // A quiet tick commits the swap to AC2F.
        manager.tick(&walk_tick(1.0));
        assert_eq!(manager.active_algorithm(), ActiveAlgorithm::Ac2f);

        manager.on_distractor_end();
        assert!(manager.future_direction().is_zero());

        // Continuous fast rotation keeps the swap back to S2C parked, so
        // AC2F stays active with no captured direction. It may only decay
        // the carried rotation, never engage a gain.
        let mut previous = f32::MAX;
        for _ in 0..120 {
            let input = TickInput {
                motion: MotionSample::new(Vec3::zero(), 40.0 * DT, DT),
                head: HeadPose::new(Vec3::new(0.0, 1.7, 1.0), Vec3::new(0.0, 0.0, 1.0)),
                center: Vec3::zero(),
                in_reset: false,
            };
            assert_eq!(manager.active_algorithm(), ActiveAlgorithm::Ac2f);
            let injected = manager.tick(&input).value().abs();
            assert_eq!(manager.applied_gain(), AppliedGain::None);
            assert!(injected <= previous + 1e-6);
            previous = injected;
        }
        assert!(previous < 1e-4);
    }

    #[test]
    fn test_applied_gain_cleared_on_skipped_ticks() {
        let mut manager = manager();
        fill_buffer(&mut manager);

        // A brisk walk away from the center applies curvature gain.
        let mut input = walk_tick(1.0);
        input.head.position = Vec3::new(2.0, 1.7, 0.0);
        manager.tick(&input);
        assert_eq!(manager.applied_gain(), AppliedGain::Curvature);

        input.in_reset = true;
        manager.tick(&input);
        assert_eq!(manager.applied_gain(), AppliedGain::None);

        input.in_reset = false;
        manager.tick(&input);
        assert_eq!(manager.applied_gain(), AppliedGain::Curvature);

        manager.set_paused(true);
        manager.tick(&input);
        assert_eq!(manager.applied_gain(), AppliedGain::None);
    }

    #[test]
    fn test_aligned_fires_once_and_zeroes_gains() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        manager.subscribe_aligned(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(manager.on_distractor_trigger().is_some());

        // Head behind the center, opposite the captured +Z direction:
        // center-to-head is (0,0,-1), dot with future is -1.
        for _ in 0..10 {
            let input = TickInput {
                motion: MotionSample::new(Vec3::zero(), 0.0, DT),
                head: HeadPose::new(Vec3::new(0.0, 1.7, -2.0), Vec3::new(0.0, 0.0, 1.0)),
                center: Vec3::zero(),
                in_reset: false,
            };
            manager.tick(&input);
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(manager.gains().min_rotation_gain(), 0.0);
        assert_eq!(manager.gains().max_rotation_gain(), 0.0);

        // Ending the episode restores the trigger-time baseline anyway.
        manager.on_distractor_end();
        assert!((manager.gains().min_rotation_gain() + 0.33).abs() < 1e-6);
    }

    #[test]
    fn test_triggered_and_ended_callbacks() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        let events = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&events);
        manager.subscribe_triggered(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = Arc::clone(&events);
        manager.subscribe_ended(Box::new(move || {
            counter.fetch_add(10, Ordering::SeqCst);
        }));

        assert!(manager.on_distractor_trigger().is_some());
        manager.on_distractor_end();
        // Ending again without an episode must not fire.
        manager.on_distractor_end();
        assert_eq!(events.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_activate_gains_reapplies_configured_values() {
        let mut manager = manager();
        manager.gains_mut().set_rotation_gains(0.0, 0.0);
        manager.gains_mut().set_curvature_radius(1.0);
        manager.activate_gains();
        assert!((manager.gains().min_rotation_gain() + 0.33).abs() < 1e-6);
        assert!((manager.gains().max_rotation_gain() - 0.49).abs() < 1e-6);
        assert!((manager.gains().curvature_radius() - 7.5).abs() < 1e-6);
    }

    #[test]
    fn test_disabling_distractors_force_ends_episode() {
        let mut manager = manager();
        fill_buffer(&mut manager);
        assert!(manager.on_distractor_trigger().is_some());

        manager.set_distractor_usage_enabled(false);
        assert!(!manager.is_distractor_active());
        assert_eq!(manager.active_algorithm(), ActiveAlgorithm::S2c);
        assert_eq!(manager.on_distractor_trigger(), None);
    }

    #[test]
    fn test_ac2f_disabled_by_config() {
        let config = RedirectionConfig {
            switch_to_ac2f_enabled: false,
            distractor_seed: Some(1),
            ..RedirectionConfig::default()
        };
        let mut manager = RedirectionManager::new(config).unwrap();
        fill_buffer(&mut manager);
        assert!(manager.on_distractor_trigger().is_some());

        for _ in 0..10 {
            manager.tick(&walk_tick(1.0));
        }
        assert_eq!(manager.active_algorithm(), ActiveAlgorithm::S2c);
    }

    #[test]
    fn test_correction_stays_finite_under_garbage_input() {
        let mut manager = manager();
        let input = TickInput {
            motion: MotionSample::new(Vec3::new(f32::NAN, 0.0, 0.0), f32::NAN, DT),
            head: HeadPose::new(Vec3::new(0.0, 1.7, 0.0), Vec3::zero()),
            center: Vec3::zero(),
            in_reset: false,
        };
        // NaN deltas must not poison later well-formed ticks.
        manager.tick(&input);
        let correction = manager.tick(&walk_tick(0.5));
        assert!(correction.value().is_finite());
    }
}
