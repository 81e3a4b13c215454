//! Lookup-table evaluator.
//!
//! Keys each sample on its quantized features and keeps a running mean of
//! the labels seen for that key. Crude, but it learns, needs no external
//! framework, and makes self-play runs meaningful in tests and benches.
//!
//! The table holds at most `max_entries` keys. Once full, known keys keep
//! updating and samples with new keys are dropped from training.

use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use tracing::debug;

use crate::error::EvaluatorError;
use crate::nn::traits::{Evaluator, FeatureBatch, FitOptions};

/// Feature values are rounded to this many steps per unit before hashing.
const QUANTIZATION: f32 = 10.0;

/// Key limit for tables built with [`TabularEvaluator::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 1 << 20;

#[derive(Clone, Debug)]
struct Entry {
    sums: Vec<f32>,
    count: u32,
}

/// Running-mean lookup table over quantized feature tuples.
#[derive(Clone, Debug)]
pub struct TabularEvaluator {
    width: usize,
    default_value: f32,
    ignored_slots: Vec<usize>,
    max_entries: usize,
    table: FxHashMap<u64, Entry>,
}

impl TabularEvaluator {
    /// A table producing `width` values per sample, `default_value` for
    /// unseen keys.
    ///
    /// # Panics
    /// Panics if `width == 0`.
    pub fn new(width: usize, default_value: f32) -> Self {
        assert!(width > 0, "evaluator width must be positive");
        Self {
            width,
            default_value,
            ignored_slots: Vec::new(),
            max_entries: DEFAULT_MAX_ENTRIES,
            table: FxHashMap::default(),
        }
    }

    /// Leave these feature slots out of the key (e.g. the noise slot).
    #[must_use]
    pub fn ignoring_slots(mut self, slots: &[usize]) -> Self {
        self.ignored_slots = slots.to_vec();
        self
    }

    /// Stop adding keys once the table holds `max_entries`.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Number of distinct keys seen in training.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if nothing has been learned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn key(&self, x: &FeatureBatch, row: usize) -> u64 {
        let mut hasher = FxHasher::default();
        for (index, slot) in x.slots().iter().enumerate() {
            if self.ignored_slots.contains(&index) {
                continue;
            }
            let width = slot.sample_len();
            index.hash(&mut hasher);
            for &value in &slot.data[row * width..(row + 1) * width] {
                ((value * QUANTIZATION).round() as i32).hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl Evaluator for TabularEvaluator {
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        let mut out = Vec::with_capacity(x.len() * self.width);
        for row in 0..x.len() {
            match self.table.get(&self.key(x, row)) {
                Some(entry) => out.extend(entry.sums.iter().map(|s| s / entry.count as f32)),
                None => out.extend(std::iter::repeat(self.default_value).take(self.width)),
            }
        }
        Ok(out)
    }

    fn fit(
        &mut self,
        x: &FeatureBatch,
        y: &[f32],
        _options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        let expected = x.len() * self.width;
        if y.len() != expected {
            return Err(EvaluatorError::Backend(format!(
                "expected {expected} labels for {} samples, got {}",
                x.len(),
                y.len()
            )));
        }

        let mut dropped = 0;
        for (row, labels) in y.chunks_exact(self.width).enumerate() {
            let key = self.key(x, row);
            if !self.table.contains_key(&key) && self.table.len() >= self.max_entries {
                dropped += 1;
                continue;
            }
            let entry = self.table.entry(key).or_insert_with(|| Entry {
                sums: vec![0.0; labels.len()],
                count: 0,
            });
            for (sum, label) in entry.sums.iter_mut().zip(labels) {
                *sum += label;
            }
            entry.count += 1;
        }
        if dropped > 0 {
            debug!(dropped, entries = self.table.len(), "tabular evaluator full");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::traits::EncodedState;

    fn batch(values: &[f32], noise: f32) -> FeatureBatch {
        let samples: Vec<_> = values
            .iter()
            .map(|&v| vec![EncodedState::vector(vec![v]), EncodedState::vector(vec![noise])])
            .collect();
        FeatureBatch::from_samples(&samples)
    }

    #[test]
    fn test_unseen_keys_use_default() {
        let table = TabularEvaluator::new(1, 0.5);
        assert_eq!(table.predict(&batch(&[1.0, 2.0], 0.0)).unwrap(), vec![0.5, 0.5]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_running_mean() {
        let mut table = TabularEvaluator::new(1, 0.5);
        let x = batch(&[1.0, 1.0, 2.0], 0.0);
        table.fit(&x, &[1.0, 0.0, 0.25], &FitOptions::default()).unwrap();

        assert_eq!(table.len(), 2);
        let predicted = table.predict(&batch(&[1.0, 2.0, 3.0], 0.0)).unwrap();
        assert_eq!(predicted, vec![0.5, 0.25, 0.5]);
    }

    #[test]
    fn test_full_table_keeps_known_keys() {
        let mut table = TabularEvaluator::new(1, 0.5).with_max_entries(2);
        let options = FitOptions::default();
        table.fit(&batch(&[1.0, 2.0, 3.0], 0.0), &[1.0, 1.0, 1.0], &options).unwrap();
        assert_eq!(table.len(), 2);

        table.fit(&batch(&[1.0, 4.0], 0.0), &[0.0, 1.0], &options).unwrap();
        assert_eq!(table.len(), 2);
        let predicted = table.predict(&batch(&[1.0, 2.0, 3.0, 4.0], 0.0)).unwrap();
        assert_eq!(predicted, vec![0.5, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_ignored_slots() {
        let mut table = TabularEvaluator::new(1, 0.0).ignoring_slots(&[1]);
        table.fit(&batch(&[1.0], 0.3), &[1.0], &FitOptions::default()).unwrap();
        assert_eq!(table.predict(&batch(&[1.0], 0.9)).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_vector_labels() {
        let mut table = TabularEvaluator::new(2, 0.0);
        table.fit(&batch(&[1.0], 0.0), &[0.2, 0.8], &FitOptions::default()).unwrap();
        assert_eq!(table.predict(&batch(&[1.0], 0.0)).unwrap(), vec![0.2, 0.8]);
    }

    #[test]
    fn test_label_count_mismatch() {
        let mut table = TabularEvaluator::new(1, 0.0);
        assert!(table.fit(&batch(&[1.0, 2.0], 0.0), &[1.0], &FitOptions::default()).is_err());
    }
}
