//! Deferred algorithm switching.
//!
//! Swapping the steering strategy while the head is turning would change the
//! injected rotation mid-gesture, which users notice immediately. A requested
//! switch is therefore parked until a tick where the head is rotating slower
//! than the gain activation threshold, and only then committed.
//!
//! Each request carries a generation token. A newer request supersedes any
//! pending one, so a stale swap can never fire after the situation that asked
//! for it has passed.

use crate::types::ActiveAlgorithm;

/// Pending-switch state machine.
#[derive(Clone, Debug)]
pub struct SwitchCoordinator {
    active: ActiveAlgorithm,
    pending: Option<PendingSwitch>,
    generation: u64,
    rotation_threshold: f32,
}

#[derive(Clone, Copy, Debug)]
struct PendingSwitch {
    target: ActiveAlgorithm,
    generation: u64,
}

impl SwitchCoordinator {
    /// Start with `initial` active and nothing pending.
    #[must_use]
    pub fn new(initial: ActiveAlgorithm, rotation_threshold: f32) -> Self {
        Self {
            active: initial,
            pending: None,
            generation: 0,
            rotation_threshold,
        }
    }

    /// The currently active algorithm.
    #[inline]
    #[must_use]
    pub fn active(&self) -> ActiveAlgorithm {
        self.active
    }

    /// True while a switch is parked waiting for a quiet head.
    #[inline]
    #[must_use]
    pub fn is_switch_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Request a switch to `target`. Supersedes any pending request; a
    /// request for the already-active algorithm clears the pending one
    /// instead of parking a no-op swap.
    pub fn request_switch(&mut self, target: ActiveAlgorithm) {
        self.generation += 1;
        if target == self.active {
            self.pending = None;
            return;
        }
        tracing::debug!(?target, generation = self.generation, "switch requested");
        self.pending = Some(PendingSwitch {
            target,
            generation: self.generation,
        });
    }

    /// Commit the pending switch if the head is quiet enough this tick.
    ///
    /// Returns the newly active algorithm on the tick the swap commits,
    /// `None` otherwise.
    pub fn poll(&mut self, angular_speed: f32) -> Option<ActiveAlgorithm> {
        let pending = self.pending?;
        if angular_speed.abs() >= self.rotation_threshold {
            return None;
        }
        // A request made after this one was parked would have replaced it,
        // so the generation here is always the latest.
        debug_assert_eq!(pending.generation, self.generation);
        self.pending = None;
        self.active = pending.target;
        tracing::debug!(active = ?self.active, "switch committed");
        Some(self.active)
    }
}

// ============================================================================
// Tests
// ============================================================================
