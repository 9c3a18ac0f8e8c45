//! Distractor trigger gate and selection bag.
//!
//! Episodes must not fire while one is already running, while the feature is
//! disabled, or within a cooldown of the previous episode's end. Distractor
//! selection draws from a shuffled bag so every distractor in the pool
//! appears once before any repeats.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::RedirectionConfig;

/// Gatekeeper for distractor episodes.
#[derive(Debug)]
pub struct DistractorGate {
    enabled: bool,
    active: bool,
    cooldown: f32,
    since_last_end: f32,
    bag: Vec<usize>,
    next_in_bag: usize,
    rng: StdRng,
    debug_override: Option<usize>,
}

impl DistractorGate {
    /// Build the gate from validated configuration.
    #[must_use]
    pub fn new(config: &RedirectionConfig) -> Self {
        let mut rng = match config.distractor_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut bag: Vec<usize> = (0..config.distractor_pool_size).collect();
        bag.shuffle(&mut rng);
        Self {
            enabled: true,
            active: false,
            // A fresh gate starts off cooldown so the first trigger is
            // never delayed.
            cooldown: config.distractor_cooldown,
            since_last_end: config.distractor_cooldown,
            bag,
            next_in_bag: 0,
            rng,
            debug_override: config.debug_distractor,
        }
    }

    /// True while an episode is running.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when the feature is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the feature.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance the cooldown clock. Call once per tick.
    pub fn tick(&mut self, delta_time: f32) {
        if !self.active && delta_time > 0.0 && delta_time.is_finite() {
            self.since_last_end += delta_time;
        }
    }

    /// Whether a new episode may begin right now.
    #[must_use]
    pub fn can_trigger(&self) -> bool {
        self.enabled && !self.active && self.since_last_end >= self.cooldown
    }

    /// Begin an episode and pick the distractor for it.
    ///
    /// Callers must check [`can_trigger`](Self::can_trigger) first; this
    /// only records the state change.
    pub fn begin(&mut self) -> usize {
        self.active = true;
        let index = self.draw();
        tracing::debug!(distractor = index, "distractor episode started");
        index
    }

    /// End the running episode and start the cooldown.
    pub fn end(&mut self) {
        self.active = false;
        self.since_last_end = 0.0;
    }

    fn draw(&mut self) -> usize {
        if let Some(index) = self.debug_override {
            return index;
        }
        if self.next_in_bag >= self.bag.len() {
            self.bag.shuffle(&mut self.rng);
            self.next_in_bag = 0;
        }
        let index = self.bag[self.next_in_bag];
        self.next_in_bag += 1;
        index
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RedirectionConfig {
        RedirectionConfig {
            distractor_seed: Some(7),
            ..RedirectionConfig::default()
        }
    }

    #[test]
    fn test_first_trigger_has_no_cooldown() {
        let gate = DistractorGate::new(&config());
        assert!(gate.can_trigger());
    }

    #[test]
    fn test_cooldown_blocks_until_elapsed() {
        let mut gate = DistractorGate::new(&config());
        gate.begin();
        assert!(!gate.can_trigger());
        gate.end();
        assert!(!gate.can_trigger());

        // Default cooldown is 10 s; 9 s is not enough.
        for _ in 0..90 {
            gate.tick(0.1);
        }
        assert!(!gate.can_trigger());
        for _ in 0..11 {
            gate.tick(0.1);
        }
        assert!(gate.can_trigger());
    }

    #[test]
    fn test_cooldown_clock_frozen_while_active() {
        let mut gate = DistractorGate::new(&config());
        gate.begin();
        for _ in 0..1000 {
            gate.tick(0.1);
        }
        gate.end();
        assert!(!gate.can_trigger());
    }

    #[test]
    fn test_disabled_gate_never_triggers() {
        let mut gate = DistractorGate::new(&config());
        gate.set_enabled(false);
        assert!(!gate.can_trigger());
        gate.set_enabled(true);
        assert!(gate.can_trigger());
    }

    #[test]
    fn test_bag_covers_pool_before_repeating() {
        let mut cfg = config();
        cfg.distractor_pool_size = 4;
        cfg.distractor_cooldown = 0.0;
        let mut gate = DistractorGate::new(&cfg);

        let mut seen = [false; 4];
        for _ in 0..4 {
            let index = gate.begin();
            gate.end();
            assert!(!seen[index], "distractor {index} repeated within one bag");
            seen[index] = true;
        }
        assert!(seen.iter().all(|&s| s));

        // Second bag covers the pool again.
        let mut seen = [false; 4];
        for _ in 0..4 {
            let index = gate.begin();
            gate.end();
            seen[index] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_debug_override_always_wins() {
        let mut cfg = config();
        cfg.debug_distractor = Some(2);
        cfg.distractor_cooldown = 0.0;
        let mut gate = DistractorGate::new(&cfg);
        for _ in 0..8 {
            assert_eq!(gate.begin(), 2);
            gate.end();
        }
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let mut first = DistractorGate::new(&config());
        let mut second = DistractorGate::new(&config());
        for _ in 0..8 {
            assert_eq!(first.begin(), second.begin());
            first.end();
            second.end();
        }
    }
}
