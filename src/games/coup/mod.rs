//! Coup table engine.
//!
//! - 2-6 players, two face-down cards and two coins each
//! - Court deck of five characters, three copies each
//! - A player is out when both cards are revealed
//!
//! The engine only stores and mutates the table; every decision is made by
//! the training wrapper.

mod game;

pub use game::{CoupGame, Hand, EXCHANGE_DRAW, STARTING_COINS, STARTING_HAND};
