//! Epsilon-greedy option selection.

use crate::core::GameRng;

/// Picks the best-scored option, or with probability `epsilon` a uniform
/// random one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplorationPolicy {
    pub epsilon: f64,
}

impl ExplorationPolicy {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Flip the exploration coin.
    pub fn explore(&self, rng: &mut GameRng) -> bool {
        self.epsilon > 0.0 && rng.gen_bool(self.epsilon)
    }

    /// Index of the first maximum. `None` for empty input.
    ///
    /// NaN scores never win.
    #[must_use]
    pub fn argmax(scores: &[f32]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &score) in scores.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |b| score > scores[b]) {
                best = Some(i);
            }
        }
        best.or_else(|| (!scores.is_empty()).then_some(0))
    }

    /// Choose among `scores.len()` options.
    ///
    /// # Panics
    /// Panics if `scores` is empty.
    pub fn choose(&self, scores: &[f32], rng: &mut GameRng) -> usize {
        assert!(!scores.is_empty(), "cannot choose among zero options");
        if self.explore(rng) {
            rng.gen_index(scores.len())
        } else {
            Self::argmax(scores).unwrap_or(0)
        }
    }
}
