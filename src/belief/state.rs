//! Belief matrix over every seat's hidden hand.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, CARD_TYPES, MAX_PLAYERS};

/// One seat's belief: an independent probability per card type.
pub type BeliefRow = [f32; CARD_TYPES];

/// `MAX_PLAYERS x CARD_TYPES` matrix of hand beliefs.
///
/// Each cell is the believed probability that the seat holds at least one
/// copy of the card. Rows do not sum to one. Eliminated seats are all zeros.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandBeliefState {
    rows: [BeliefRow; MAX_PLAYERS],
}

impl HandBeliefState {
    /// Every cell set to `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            rows: [[initial.clamp(0.0, 1.0); CARD_TYPES]; MAX_PLAYERS],
        }
    }

    /// The full matrix, seat order.
    #[must_use]
    pub fn rows(&self) -> &[BeliefRow; MAX_PLAYERS] {
        &self.rows
    }

    /// Belief about `player`'s hand.
    #[must_use]
    pub fn row(&self, player: PlayerId) -> &BeliefRow {
        &self.rows[player.index()]
    }

    /// Overwrite `player`'s row, clamping each value into `[0, 1]`.
    ///
    /// Extra values are ignored; missing ones leave the cell unchanged.
    pub fn set_row(&mut self, player: PlayerId, values: &[f32]) {
        for (cell, &value) in self.rows[player.index()].iter_mut().zip(values) {
            *cell = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        }
    }

    /// Zero `player`'s row. Used on elimination.
    pub fn zero_row(&mut self, player: PlayerId) {
        self.rows[player.index()] = [0.0; CARD_TYPES];
    }
}

impl Default for HandBeliefState {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_INITIAL_BELIEF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_belief() {
        let beliefs = HandBeliefState::default();
        for row in beliefs.rows() {
            assert_eq!(row, &[0.4; CARD_TYPES]);
        }
    }

    #[test]
    fn test_set_row_clamps() {
        let mut beliefs = HandBeliefState::new(0.4);
        let p = PlayerId::new(2);
        beliefs.set_row(p, &[1.5, -0.2, 0.3, f32::NAN, 0.9]);
        assert_eq!(beliefs.row(p), &[1.0, 0.0, 0.3, 0.0, 0.9]);
        assert_eq!(beliefs.row(PlayerId::new(1)), &[0.4; CARD_TYPES]);
    }

    #[test]
    fn test_zero_row() {
        let mut beliefs = HandBeliefState::new(0.4);
        beliefs.zero_row(PlayerId::new(0));
        assert_eq!(beliefs.row(PlayerId::new(0)), &[0.0; CARD_TYPES]);
    }
}
