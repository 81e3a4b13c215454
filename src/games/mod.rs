//! Game implementations driven by the training pipeline.

pub mod coup;
