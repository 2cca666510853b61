//! FILENAME: core/dataset/src/rng.rs
//! PURPOSE: Seeded linear-congruential generator for the demo dataset.
//! CONTEXT: The exact recurrence is part of the dataset contract: every
//! synthesized measure depends on it, so it is not swapped for a library RNG.

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233280;

/// Seed used for the published demo dataset.
pub const DEFAULT_SEED: u64 = 42;

/// `seed = (seed * 9301 + 49297) mod 233280`, yielding `seed / 233280`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        // Reducing first keeps the multiplication in range without
        // changing any output of the recurrence.
        SeededRandom {
            state: seed % MODULUS,
        }
    }

    /// Advances the generator and returns a value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        SeededRandom::new(DEFAULT_SEED)
    }
}
