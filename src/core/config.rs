//! Trainer configuration.
//!
//! `TrainerConfig` carries every tunable the turn orchestrator reads. It is
//! plain data with builder-style setters and a `validate` step, and it is
//! serializable so a run's settings can be stored next to its models.

use serde::{Deserialize, Serialize};

use super::player::{MAX_PLAYERS, MIN_PLAYERS};
use crate::error::ConfigError;
use crate::nn::FitOptions;

/// Reward delta moved away from a player each time they lose a card.
pub const DEFAULT_LOSS_BIAS: f32 = 0.3;

/// Belief value every (player, card) cell starts at.
pub const DEFAULT_INITIAL_BELIEF: f32 = 0.4;

/// Length of the noise feature vector.
pub const NOISE_LEN: usize = 5;

/// Configuration for a self-play training wrapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of seated players (2-6).
    pub player_count: usize,

    /// Exploration rate: probability of a uniform random choice at every
    /// decision point instead of the evaluator's arg-max.
    pub epsilon: f64,

    /// Pending-bias delta for a card loss.
    pub loss_bias: f32,

    /// Initial value of every belief cell.
    pub initial_belief: f32,

    /// Mean of the noise feature.
    pub noise_mean: f32,

    /// Standard deviation of the noise feature.
    pub noise_std: f32,

    /// Options passed to `Evaluator::fit` in training cycles.
    pub fit: FitOptions,

    /// Seed for all simulation randomness.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            epsilon: 0.1,
            loss_bias: DEFAULT_LOSS_BIAS,
            initial_belief: DEFAULT_INITIAL_BELIEF,
            noise_mean: 0.5,
            noise_std: 0.5,
            fit: FitOptions::default(),
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Default configuration for `player_count` players.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Set the exploration rate.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the card-loss bias.
    #[must_use]
    pub fn with_loss_bias(mut self, loss_bias: f32) -> Self {
        self.loss_bias = loss_bias;
        self
    }

    /// Set the initial belief value.
    #[must_use]
    pub fn with_initial_belief(mut self, value: f32) -> Self {
        self.initial_belief = value;
        self
    }

    /// Set the noise distribution.
    #[must_use]
    pub fn with_noise(mut self, mean: f32, std: f32) -> Self {
        self.noise_mean = mean;
        self.noise_std = std;
        self
    }

    /// Set the fit options used by training cycles.
    #[must_use]
    pub fn with_fit_options(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        if !self.loss_bias.is_finite() {
            return Err(ConfigError::NotFinite("loss_bias"));
        }
        if !(0.0..=1.0).contains(&self.initial_belief) {
            return Err(ConfigError::InitialBelief(self.initial_belief));
        }
        if !self.noise_mean.is_finite() {
            return Err(ConfigError::NotFinite("noise_mean"));
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(ConfigError::NoiseStd(self.noise_std));
        }
        if self.fit.batch_size == 0 {
            return Err(ConfigError::BatchSize);
        }
        Ok(())
    }
}
