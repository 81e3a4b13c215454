//! Self-play loop: whole games with periodic training.
//!
//! The worker reuses one `GameTrainingWrapper`, and so one set of
//! evaluators, across games. Each game is dealt from its own seed, played
//! until someone wins or the turn limit is hit, and every evaluator is fit
//! on the completed samples every `train_interval` turns and once at the end.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ledger::DecisionType;
use super::wrapper::{EvaluatorSet, GameTrainingWrapper, TurnOutcome};
use crate::core::{PlayerId, TrainerConfig};
use crate::error::{ConfigError, TrainingError};

/// Reward written for the survivors of a game abandoned at the turn limit.
pub const DRAW_REWARD: f32 = 0.5;

/// Configuration for self-play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfPlayConfig {
    /// Maximum turns per game (to prevent endless games).
    pub max_turns: usize,

    /// Train every this many turns. 0 = only at the end of each game.
    pub train_interval: usize,

    /// Seed offset for RNG (combined with game index for unique seeds).
    pub seed_offset: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            max_turns: 500,
            train_interval: 50,
            seed_offset: 0,
        }
    }
}

impl SelfPlayConfig {
    /// Create a new self-play config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum turns per game.
    #[must_use]
    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    /// Set the training interval in turns.
    #[must_use]
    pub fn with_train_interval(mut self, turns: usize) -> Self {
        self.train_interval = turns;
        self
    }

    /// Set seed offset.
    #[must_use]
    pub fn with_seed_offset(mut self, offset: u64) -> Self {
        self.seed_offset = offset;
        self
    }
}

/// Result of one self-play game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub seed: u64,
    pub turns: usize,
    /// Sole survivor, if the game finished with one.
    pub winner: Option<PlayerId>,
    /// `false` if the game was abandoned at the turn limit.
    pub completed: bool,
    /// Samples fit per decision type, in `DecisionType::ALL` order.
    pub trained: [usize; DecisionType::COUNT],
}

impl GameSummary {
    /// Samples fit across all decision types.
    #[must_use]
    pub fn total_trained(&self) -> usize {
        self.trained.iter().sum()
    }
}

/// Worker for running self-play games.
#[derive(Debug)]
pub struct SelfPlayWorker {
    wrapper: GameTrainingWrapper,
    config: SelfPlayConfig,
    base_seed: u64,
}

impl SelfPlayWorker {
    /// Create a new self-play worker.
    pub fn new(
        trainer: TrainerConfig,
        config: SelfPlayConfig,
        evaluators: EvaluatorSet,
    ) -> Result<Self, ConfigError> {
        let base_seed = trainer.seed;
        Ok(Self {
            wrapper: GameTrainingWrapper::new(trainer, evaluators)?,
            config,
            base_seed,
        })
    }

    /// Seed of game `index`.
    #[must_use]
    pub fn game_seed(&self, index: u64) -> u64 {
        self.base_seed
            .wrapping_add(self.config.seed_offset)
            .wrapping_add(index)
    }

    /// Play game `index` to the end or the turn limit, training as configured.
    pub fn play_game(&mut self, index: u64) -> Result<GameSummary, TrainingError> {
        let seed = self.game_seed(index);
        self.wrapper.new_game(seed);

        let mut trained = [0; DecisionType::COUNT];
        let mut winner = None;
        let mut completed = false;

        while self.wrapper.turns() < self.config.max_turns {
            let report = self.wrapper.take_turn()?;

            let turns = self.wrapper.turns();
            if self.config.train_interval > 0 && turns % self.config.train_interval == 0 {
                accumulate(&mut trained, self.wrapper.train_all_evaluators()?);
            }

            if let TurnOutcome::GameOver { winner: survivor } = report.outcome {
                winner = survivor;
                completed = true;
                break;
            }
        }

        if !completed {
            let flushed = self.wrapper.flush_survivors(DRAW_REWARD);
            debug!(seed, flushed, "turn limit reached");
        }
        accumulate(&mut trained, self.wrapper.train_all_evaluators()?);

        let summary = GameSummary {
            seed,
            turns: self.wrapper.turns(),
            winner,
            completed,
            trained,
        };
        info!(
            seed,
            turns = summary.turns,
            winner = ?summary.winner,
            trained = summary.total_trained(),
            "self-play game finished"
        );
        Ok(summary)
    }

    /// Play `count` games in sequence.
    pub fn play_games(&mut self, count: usize) -> Result<Vec<GameSummary>, TrainingError> {
        (0..count as u64).map(|i| self.play_game(i)).collect()
    }

    /// Get the wrapper.
    #[must_use]
    pub fn wrapper(&self) -> &GameTrainingWrapper {
        &self.wrapper
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    /// Give back the trained evaluators.
    pub fn into_evaluators(self) -> EvaluatorSet {
        self.wrapper.into_evaluators()
    }
}

fn accumulate(total: &mut [usize; DecisionType::COUNT], batch: [usize; DecisionType::COUNT]) {
    for (sum, count) in total.iter_mut().zip(batch) {
        *sum += count;
    }
}
