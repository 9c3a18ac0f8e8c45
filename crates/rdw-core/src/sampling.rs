//! Position sampling and short-horizon walking-direction estimation.
//!
//! A fixed-capacity ring buffer of recent head translations, filled at a
//! configured rate independent of frame rate. Averaging one second of
//! translations gives the "future virtual walking direction" captured when a
//! distractor episode begins.

use crate::math::flattened_dir;
use crate::types::Vec3;

/// Ring buffer of per-tick translation vectors with overwrite-oldest
/// semantics. Never blocks, never grows.
#[derive(Clone, Debug)]
pub struct PositionSampleBuffer {
    samples: Vec<Vec3>,
    capacity: usize,
    head: usize,
    len: usize,
    sample_interval: f32,
    accumulator: f32,
}

impl PositionSampleBuffer {
    /// Create a buffer holding one second of samples at `samples_per_second`.
    #[must_use]
    pub fn new(samples_per_second: u32) -> Self {
        let capacity = samples_per_second.max(1) as usize;
        Self {
            samples: vec![Vec3::zero(); capacity],
            capacity,
            head: 0,
            len: 0,
            sample_interval: 1.0 / samples_per_second.max(1) as f32,
            accumulator: 0.0,
        }
    }

    /// Number of samples currently held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no sample has been pushed yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed capacity of the buffer.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The `i`-th oldest sample still in the buffer.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<Vec3> {
        if i < self.len {
            Some(self.samples[(self.head + i) % self.capacity])
        } else {
            None
        }
    }

    /// Push a sample, overwriting the oldest when full.
    pub fn push(&mut self, sample: Vec3) {
        let tail = (self.head + self.len) % self.capacity;
        self.samples[tail] = sample;
        if self.len < self.capacity {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Advance the sampling clock by `delta_time` and push `delta_pos` once
    /// a full sample interval has elapsed.
    pub fn accumulate(&mut self, delta_pos: Vec3, delta_time: f32) {
        if !(delta_time > 0.0) || !delta_pos.is_finite() {
            return;
        }
        self.accumulator += delta_time;
        if self.accumulator >= self.sample_interval {
            self.accumulator -= self.sample_interval;
            self.push(delta_pos);
        }
    }

    /// Average of all buffered samples, flattened and normalized.
    ///
    /// Returns zero when the buffer is empty or the samples cancel out;
    /// callers treat that as "no future direction available".
    #[must_use]
    pub fn average_direction(&self) -> Vec3 {
        if self.len == 0 {
            return Vec3::zero();
        }
        let mut sum = Vec3::zero();
        for i in 0..self.len {
            sum = sum + self.samples[(self.head + i) % self.capacity];
        }
        flattened_dir(sum * (1.0 / self.len as f32))
    }
}

// ============================================================================
// Tests
// ============================================================================
