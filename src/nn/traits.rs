//! Evaluator contract and feature tensors.
//!
//! An evaluator is an opaque model that scores batches of fixed-shape
//! feature tuples and can be trained on (tuple, label) pairs. The training
//! pipeline never looks inside one.

use serde::{Deserialize, Serialize};

use crate::error::EvaluatorError;

/// One feature slot of one sample, as a flat row-major tensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor (e.g. `[5]` or `[6, 5]`).
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// A rank-1 tensor.
    pub fn vector(values: impl Into<Vec<f32>>) -> Self {
        let tensor = values.into();
        let len = tensor.len();
        Self::new(tensor, vec![len])
    }

    /// A rank-2 tensor from fixed-width rows.
    pub fn matrix<const C: usize>(rows: &[[f32; C]]) -> Self {
        let tensor = rows.iter().flat_map(|row| row.iter().copied()).collect();
        Self::new(tensor, vec![rows.len(), C])
    }

    /// Get the total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    /// Check if the tensor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// Element-wise negation.
    #[must_use]
    pub fn negated(mut self) -> Self {
        for value in &mut self.tensor {
            *value = -*value;
        }
        self
    }
}

/// The inputs of one sample: one tensor per feature slot, in a fixed order.
pub type FeatureTuple = Vec<EncodedState>;

/// One feature slot across every sample of a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSlot {
    /// Per-sample shape.
    pub shape: Vec<usize>,

    /// Sample-major data, `rows * shape.product()` values.
    pub data: Vec<f32>,
}

impl FeatureSlot {
    /// Values per sample.
    #[must_use]
    pub fn sample_len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Batch shape: `[rows, shape...]`.
    #[must_use]
    pub fn batch_shape(&self, rows: usize) -> Vec<usize> {
        std::iter::once(rows).chain(self.shape.iter().copied()).collect()
    }
}

/// Column-oriented batch of feature tuples.
///
/// Slot `k` of every sample is stored contiguously, which is the layout a
/// multi-input model expects (one array per input, leading sample axis).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBatch {
    rows: usize,
    slots: Vec<FeatureSlot>,
}

impl FeatureBatch {
    /// Build a batch from samples sharing one slot layout.
    ///
    /// # Panics
    /// Panics if two samples disagree on slot count or slot shapes.
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a FeatureTuple>) -> Self {
        let mut batch = Self::default();
        for sample in samples {
            batch.push(sample);
        }
        batch
    }

    /// `rows` copies of one sample.
    pub fn tile(sample: &FeatureTuple, rows: usize) -> Self {
        let mut batch = Self::default();
        for _ in 0..rows {
            batch.push(sample);
        }
        batch
    }

    /// Append one sample.
    ///
    /// # Panics
    /// Panics if the sample's layout differs from the batch's.
    pub fn push(&mut self, sample: &FeatureTuple) {
        if self.rows == 0 && self.slots.is_empty() {
            self.slots = sample
                .iter()
                .map(|slot| FeatureSlot {
                    shape: slot.shape.clone(),
                    data: Vec::new(),
                })
                .collect();
        }
        assert_eq!(self.slots.len(), sample.len(), "feature slot count mismatch");
        for (slot, value) in self.slots.iter_mut().zip(sample) {
            assert_eq!(slot.shape, value.shape, "feature slot shape mismatch");
            slot.data.extend_from_slice(&value.tensor);
        }
        self.rows += 1;
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Check if the batch has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Feature slots.
    #[must_use]
    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    /// Copy out sample `row`.
    ///
    /// # Panics
    /// Panics if `row >= len()`.
    #[must_use]
    pub fn sample(&self, row: usize) -> FeatureTuple {
        assert!(row < self.rows, "sample {row} out of range for batch of {}", self.rows);
        self.slots
            .iter()
            .map(|slot| {
                let width = slot.sample_len();
                let start = row * width;
                EncodedState::new(slot.data[start..start + width].to_vec(), slot.shape.clone())
            })
            .collect()
    }
}

/// Options for `Evaluator::fit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    pub batch_size: usize,
    pub epochs: usize,
    /// Backend verbosity level (0 = silent).
    pub verbose: u8,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            epochs: 1,
            verbose: 0,
        }
    }
}

/// A learned scoring model for one decision type.
///
/// `predict` returns `width` values per sample, row-major; decision
/// evaluators have width 1, the hand predictor has one value per card type.
/// Labels passed to `fit` use the same layout.
pub trait Evaluator {
    /// Score every sample of `x`.
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError>;

    /// Train on `x` with targets `y`.
    fn fit(
        &mut self,
        x: &FeatureBatch,
        y: &[f32],
        options: &FitOptions,
    ) -> Result<(), EvaluatorError>;

    /// Predict, then train on the same batch, returning the predictions.
    ///
    /// Backends with a fused call should override this; the result must
    /// match predict-then-fit.
    fn fit_predict(
        &mut self,
        x: &FeatureBatch,
        y: &[f32],
        options: &FitOptions,
    ) -> Result<Vec<f32>, EvaluatorError> {
        let predictions = self.predict(x)?;
        self.fit(x, y, options)?;
        Ok(predictions)
    }

    /// `predict`, checking that exactly `width` values came back per sample.
    fn predict_rows(&self, x: &FeatureBatch, width: usize) -> Result<Vec<f32>, EvaluatorError> {
        let scores = self.predict(x)?;
        let expected = x.len() * width;
        if scores.len() != expected {
            return Err(EvaluatorError::OutputCount {
                expected,
                got: scores.len(),
            });
        }
        Ok(scores)
    }
}

/// Evaluator that scores everything the same and ignores training.
///
/// With arg-max selection a constant evaluator always picks the first
/// option, which makes it a handy deterministic baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantEvaluator {
    value: f32,
    width: usize,
}

impl ConstantEvaluator {
    /// Scalar evaluator returning `value`.
    pub fn new(value: f32) -> Self {
        Self { value, width: 1 }
    }

    /// Evaluator returning `width` copies of `value` per sample.
    pub fn with_width(value: f32, width: usize) -> Self {
        Self { value, width }
    }
}

impl Default for ConstantEvaluator {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Evaluator for ConstantEvaluator {
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        Ok(vec![self.value; x.len() * self.width])
    }

    fn fit(
        &mut self,
        _x: &FeatureBatch,
        _y: &[f32],
        _options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(a: f32) -> FeatureTuple {
        vec![
            EncodedState::vector(vec![a, a + 1.0]),
            EncodedState::matrix(&[[a; 3], [a * 2.0; 3]]),
        ]
    }

    #[test]
    fn test_encoded_state_constructors() {
        let v = EncodedState::vector(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.shape, vec![3]);

        let m = EncodedState::matrix(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(m.shape, vec![3, 2]);
        assert_eq!(m.tensor, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.len(), 6);
        assert!(!m.is_empty());
    }

    #[test]
    fn test_negated() {
        let v = EncodedState::vector(vec![0.0, 1.0]).negated();
        assert_eq!(v.tensor, vec![-0.0, -1.0]);
    }

    #[test]
    fn test_batch_from_samples() {
        let samples = vec![sample(1.0), sample(2.0)];
        let batch = FeatureBatch::from_samples(&samples);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.slots().len(), 2);
        assert_eq!(batch.slots()[0].data, vec![1.0, 2.0, 2.0, 3.0]);
        assert_eq!(batch.slots()[1].batch_shape(batch.len()), vec![2, 2, 3]);
        assert_eq!(batch.sample(1), samples[1]);
    }

    #[test]
    fn test_batch_tile() {
        let batch = FeatureBatch::tile(&sample(1.0), 3);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.sample(2), sample(1.0));
        assert_eq!(batch, FeatureBatch::from_samples(&[sample(1.0), sample(1.0), sample(1.0)]));
    }

    #[test]
    #[should_panic(expected = "feature slot shape mismatch")]
    fn test_batch_rejects_mismatched_shapes() {
        let mut batch = FeatureBatch::from_samples(&[sample(1.0)]);
        batch.push(&vec![EncodedState::vector(vec![1.0]), EncodedState::vector(vec![1.0])]);
    }

    #[test]
    fn test_constant_evaluator() {
        let batch = FeatureBatch::tile(&sample(0.0), 4);
        let evaluator = ConstantEvaluator::new(0.25);
        assert_eq!(evaluator.predict(&batch).unwrap(), vec![0.25; 4]);

        let wide = ConstantEvaluator::with_width(0.4, 5);
        assert_eq!(wide.predict_rows(&batch, 5).unwrap().len(), 20);
    }

    #[test]
    fn test_predict_rows_checks_count() {
        let batch = FeatureBatch::tile(&sample(0.0), 2);
        let err = ConstantEvaluator::new(0.0).predict_rows(&batch, 5).unwrap_err();
        assert_eq!(err, EvaluatorError::OutputCount { expected: 10, got: 2 });
    }

    #[test]
    fn test_default_fit_predict_is_predict_then_fit() {
        let batch = FeatureBatch::tile(&sample(0.0), 2);
        let mut evaluator = ConstantEvaluator::new(0.7);
        let out = evaluator
            .fit_predict(&batch, &[1.0, 0.0], &FitOptions::default())
            .unwrap();
        assert_eq!(out, vec![0.7, 0.7]);
    }

    #[test]
    fn test_serialization() {
        let batch = FeatureBatch::from_samples(&[sample(1.0)]);
        let json = serde_json::to_string(&batch).unwrap();
        let deserialized: FeatureBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(batch, deserialized);
    }
}
