//! Self-play training pipeline.
//!
//! This module turns Coup games into labelled training data for the six
//! decision evaluators, using deferred (temporal-difference style) rewards.
//!
//! ## Overview
//!
//! - **DecisionQueue**: inputs now, labels later, matched in arrival order
//! - **DecisionLedger**: one queue per player per `DecisionType`
//! - **PendingBias**: card-loss reward shifts carried to the next back-fill
//! - **GameTrainingWrapper**: plays one turn at a time and keeps the ledger
//!   consistent; block/challenge decisions and contest resolution live in
//!   `decide` and `resolution`
//! - **SelfPlayWorker**: plays whole games and trains periodically
//!
//! ## Usage
//!
//! ```rust
//! use coup_selfplay::core::TrainerConfig;
//! use coup_selfplay::training::{EvaluatorSet, GameTrainingWrapper, TurnOutcome};
//!
//! let config = TrainerConfig::new(3).with_seed(1);
//! let mut wrapper = GameTrainingWrapper::new(config, EvaluatorSet::tabular()).unwrap();
//!
//! for _ in 0..20 {
//!     let report = wrapper.take_turn().unwrap();
//!     if let TurnOutcome::GameOver { .. } = report.outcome {
//!         break;
//!     }
//! }
//! let trained = wrapper.train_all_evaluators().unwrap();
//! assert_eq!(trained.len(), 6);
//! ```

pub mod batch;
pub mod bias;
pub mod decide;
pub mod ledger;
pub mod policy;
pub mod queue;
pub mod resolution;
pub mod self_play;
pub mod wrapper;

// Re-export main types
pub use batch::{combine_ready_from_list, TrainingBatch};
pub use bias::PendingBias;
pub use decide::{BlockContext, BlockDecision, ChallengeDecision};
pub use ledger::{DecisionLedger, DecisionType, LedgerCheckpoint};
pub use policy::ExplorationPolicy;
pub use queue::{CompletedData, DecisionQueue};
pub use resolution::{Contest, ContestPhase, Resolution};
pub use self_play::{GameSummary, SelfPlayConfig, SelfPlayWorker, DRAW_REWARD};
pub use wrapper::{
    EvaluatorSet, GameTrainingWrapper, TurnOutcome, TurnReport, ELIMINATION_REWARD, VICTORY_REWARD,
};
