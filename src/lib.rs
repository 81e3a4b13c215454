//! # coup-selfplay
//!
//! Self-play simulator for the card game Coup that produces training data
//! for six pluggable evaluators.
//!
//! ## Design Principles
//!
//! 1. **Evaluators Are Opaque**: Anything implementing `Evaluator`
//!    (`predict` and `fit` over batched feature tuples) can drive play.
//!    Lookup tables ship in the crate; Keras models plug in through the
//!    `python` feature.
//!
//! 2. **Deferred Rewards**: Every decision is queued and labelled later,
//!    with the best score of the decider's next turn, 0 on elimination or 1
//!    on victory.
//!
//! 3. **Seat-Relative Encoding**: Every feature tensor is arranged around
//!    the deciding player, so one evaluator serves every seat.
//!
//! 4. **Deterministic**: One seed drives dealing, exploration and noise.
//!
//! ## Modules
//!
//! - `core`: Seats, cards, action codes, RNG, configuration
//! - `games`: The Coup table engine
//! - `nn`: Feature tensors, encoders and the `Evaluator` trait
//! - `belief`: Public beliefs about every hand
//! - `training`: Decision queues, turn resolution and self-play
//! - `python`: PyO3 bindings (feature `python`)

pub mod belief;
pub mod core;
pub mod error;
pub mod games;
pub mod nn;
pub mod training;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    Action, ActiveAction, Block, Card, GameRng, PlayerId, PlayerMap, TrainerConfig,
};

pub use crate::error::{ConfigError, EvaluatorError, TrainingError};

pub use crate::games::coup::CoupGame;

pub use crate::nn::{
    ConstantEvaluator, EncodedState, Evaluator, FeatureBatch, FeatureTuple, FitOptions,
    TabularEvaluator,
};

pub use crate::belief::{BeliefEvent, HandBeliefState};

pub use crate::training::{
    DecisionLedger, DecisionQueue, DecisionType, EvaluatorSet, GameTrainingWrapper,
    SelfPlayConfig, SelfPlayWorker, TurnOutcome, TurnReport,
};
