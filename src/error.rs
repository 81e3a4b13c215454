//! Error types.
//!
//! Invariant violations (a decision queue with more labels than inputs) are
//! programming errors and panic. Everything a caller can cause or recover
//! from is one of the enums below.

use thiserror::Error;

use crate::core::PlayerId;

/// Invalid `TrainerConfig` field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("player count must be between 2 and 6, got {0}")]
    PlayerCount(usize),

    #[error("epsilon must lie in [0, 1], got {0}")]
    Epsilon(f64),

    #[error("initial belief must lie in [0, 1], got {0}")]
    InitialBelief(f32),

    #[error("noise std must be finite and non-negative, got {0}")]
    NoiseStd(f32),

    #[error("{0} must be finite")]
    NotFinite(&'static str),

    #[error("fit batch size must be positive")]
    BatchSize,
}

/// Failure inside an evaluator call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorError {
    /// The model backend raised (e.g. a Python exception).
    #[error("evaluator backend failed: {0}")]
    Backend(String),

    /// `predict` returned a different number of values than expected.
    #[error("evaluator returned {got} values, expected {expected}")]
    OutputCount { expected: usize, got: usize },
}

/// Failure while running or training a self-play game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    /// No option could be enumerated for the acting player.
    #[error("{player} has no legal action")]
    NoLegalActions { player: PlayerId },

    /// `take_turn` was called after the game ended.
    #[error("the game is already over")]
    GameOver,
}
