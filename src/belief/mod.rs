//! Running beliefs about every player's hidden hand.
//!
//! - **State**: `HandBeliefState`, a `MAX_PLAYERS x CARD_TYPES` matrix
//! - **Update**: `BeliefEvent` and `update_beliefs`, which route observed
//!   events through the hand predictor

pub mod state;
pub mod update;

pub use state::{BeliefRow, HandBeliefState};
pub use update::{update_beliefs, BeliefEvent};
