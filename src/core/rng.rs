//! Deterministic random number generation for self-play.
//!
//! All non-determinism in a simulation flows through one seeded `GameRng`:
//! exploration coin flips, uniform fallback choices, communal challenger
//! picks, deck shuffles and the noise feature. Replaying a seed replays the
//! game exactly, provided the evaluators are deterministic too.
//!
//! ```
//! use coup_selfplay::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(a.gen_index(10), b.gen_index(10));
//!
//! // Independent stream for the court deck
//! let mut deck = a.for_context("deck");
//! let _ = deck.gen_index(15);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::hash::{Hash, Hasher};

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Uniform index in `0..len`.
    ///
    /// # Panics
    /// Panics if `len == 0`.
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// `true` with the given probability.
    ///
    /// The probability is clamped to `[0, 1]`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// `len` samples from a normal distribution.
    ///
    /// A non-positive or non-finite `std` yields the mean.
    pub fn normal_vec(&mut self, mean: f32, std: f32, len: usize) -> Vec<f32> {
        match Normal::new(mean, std) {
            Ok(dist) if std > 0.0 => (0..len).map(|_| dist.sample(&mut self.inner)).collect(),
            _ => vec![mean; len],
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}
