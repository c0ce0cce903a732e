//! Random number source used by ranged values and chance conditions.

use rand::Rng;
use std::cell::Cell;

/// Random number generation abstraction.
///
/// # Implementations
///
/// - [`ThreadRandom`] for live play, backed by `rand::thread_rng()`
/// - [`FixedRandom`] for deterministic tests
pub trait RandomSource {
    /// Uniform value in `[min, max]`, inclusive on both ends.
    ///
    /// Bounds given in the wrong order are swapped.
    fn rng(&self, min: i64, max: i64) -> i64;

    /// True with probability `1/n`. Always true for `n <= 1`.
    fn one_in(&self, n: i64) -> bool {
        n <= 1 || self.rng(0, n - 1) == 0
    }

    /// True with probability `x/y`.
    fn x_in_y(&self, x: i64, y: i64) -> bool {
        if x <= 0 {
            return false;
        }
        if x >= y {
            return true;
        }
        self.rng(1, y) <= x
    }
}

/// Production random number generator using thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn rng(&self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Fixed random source for deterministic testing.
///
/// Returns values from a provided sequence, cycling if needed, clamped to the
/// requested range.
#[derive(Debug, Clone)]
pub struct FixedRandom {
    values: Vec<i64>,
    index: Cell<usize>,
}

impl FixedRandom {
    pub fn new(values: Vec<i64>) -> Self {
        Self {
            values,
            index: Cell::new(0),
        }
    }

    /// A source that always returns the same value.
    pub fn constant(value: i64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedRandom {
    fn rng(&self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        if self.values.is_empty() {
            return low;
        }
        let idx = self.index.get();
        self.index.set(idx + 1);
        self.values[idx % self.values.len()].clamp(low, high)
    }
}
