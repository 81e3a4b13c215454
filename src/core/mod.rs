//! Core types: seats, cards, action codes, RNG, configuration.
//!
//! Everything here is plain data shared by the engine, the encoders and the
//! training pipeline.

pub mod action;
pub mod card;
pub mod config;
pub mod player;
pub mod rng;

pub use action::{
    Action, ActiveAction, Block, ASSASSINATE_COST, COUP_COST, FORCED_COUP_COINS, NUM_ACTIONS,
    NUM_ACTIVE_ACTIONS, NUM_CHALLENGEABLE_ACTIONS,
};
pub use card::{one_hot_cards, Card, CARD_TYPES, COPIES_PER_CARD};
pub use config::{TrainerConfig, DEFAULT_INITIAL_BELIEF, DEFAULT_LOSS_BIAS, NOISE_LEN};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS, MIN_PLAYERS, NUM_RELATIVE_TARGETS};
pub use rng::GameRng;
