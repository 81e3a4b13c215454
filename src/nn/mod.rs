//! Evaluators and their feature tensors.
//!
//! ## Overview
//!
//! - **Traits**: `Evaluator`, the predict/fit contract every decision model
//!   implements, plus `FeatureBatch`/`EncodedState` tensors
//! - **Encoding**: `FeatureEncoder` and the row canonicalisation helpers
//! - **Baselines**: `ConstantEvaluator`, `TabularEvaluator`
//!
//! ## Usage
//!
//! ```rust
//! use coup_selfplay::nn::{ConstantEvaluator, EncodedState, Evaluator, FeatureBatch};
//!
//! let sample = vec![EncodedState::vector(vec![1.0, 0.0])];
//! let batch = FeatureBatch::tile(&sample, 3);
//! let scores = ConstantEvaluator::new(0.5).predict(&batch).unwrap();
//! assert_eq!(scores, vec![0.5; 3]);
//! ```

pub mod encoder;
pub mod tabular;
pub mod traits;

// Re-export main types
pub use encoder::{
    action_option, challenge_option, one_hot, row_to_first, rows_to_first_second, with_option,
    FeatureEncoder, Viewpoint, SHARED_SLOTS,
};
pub use tabular::{TabularEvaluator, DEFAULT_MAX_ENTRIES};
pub use traits::{
    ConstantEvaluator, EncodedState, Evaluator, FeatureBatch, FeatureSlot, FeatureTuple,
    FitOptions,
};
