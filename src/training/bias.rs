//! Reward bias carried to each player's next back-fill.

use crate::core::{PlayerId, PlayerMap};

/// Per-player scalar added to the next back-filled reward.
///
/// A card loss moves `loss_bias` away from the loser and spreads it evenly
/// over every seat, so the deltas of one loss sum to zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingBias {
    values: PlayerMap<f32>,
}

impl PendingBias {
    pub fn new(player_count: usize) -> Self {
        Self {
            values: PlayerMap::with_value(player_count, 0.0),
        }
    }

    /// Apply the deltas for `loser` losing a card.
    pub fn record_loss(&mut self, loser: PlayerId, loss_bias: f32) {
        let share = loss_bias / self.values.player_count() as f32;
        self.values[loser] -= loss_bias;
        for (_, value) in self.values.iter_mut() {
            *value += share;
        }
    }

    /// Current bias of `player`.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> f32 {
        self.values[player]
    }

    /// Consume `player`'s bias, resetting it to zero.
    pub fn take(&mut self, player: PlayerId) -> f32 {
        std::mem::take(&mut self.values[player])
    }

    /// Sum over all seats.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.values.values().sum()
    }
}
