//! Injectable random sources
//!
//! Every dice-like decision of the battle (initiative, loot, AI tie-breaks)
//! goes through a [`RandomGenerator`], so a battle is replayable from its
//! seed or from a recorded value sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random values
pub trait RandomGenerator {
    /// Uniform value in `[0, 1)`
    fn random(&mut self) -> f64;

    /// Uniform integer in `[from, to]` (both included)
    fn rand_int(&mut self, from: i64, to: i64) -> i64 {
        if to <= from {
            return from;
        }
        let span = (to - from + 1) as f64;
        from + ((self.random() * span).floor() as i64).min(to - from)
    }

    /// Fair coin
    fn bool(&mut self) -> bool {
        self.rand_int(0, 1) == 0
    }

    /// Index of a random element of a collection of `len` items
    fn choice_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rand_int(0, len as i64 - 1) as usize)
        }
    }

    /// Random element of a slice
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        self.choice_index(items.len()).map(|index| &items[index])
    }
}

/// Seeded generator for reproducible battles
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomGenerator for SeededRandom {
    fn random(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Generator replaying a fixed sequence of values
///
/// Once the sequence is exhausted (and not looping), values come from a
/// fixed-seed fallback generator so results stay deterministic.
#[derive(Debug, Clone)]
pub struct SkewedRandom {
    values: Vec<f64>,
    index: usize,
    looping: bool,
    fallback: SeededRandom,
}

impl SkewedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            index: 0,
            looping: false,
            fallback: SeededRandom::new(0),
        }
    }

    /// Replay the sequence forever
    pub fn looping(values: Vec<f64>) -> Self {
        Self {
            looping: true,
            ..Self::new(values)
        }
    }
}

impl RandomGenerator for SkewedRandom {
    fn random(&mut self) -> f64 {
        let result = self.values.get(self.index).copied();
        self.index += 1;
        if self.looping && self.index >= self.values.len() {
            self.index = 0;
        }
        match result {
            Some(value) => value,
            None => self.fallback.random(),
        }
    }
}
