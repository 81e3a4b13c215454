//! Feature encoding for the decision evaluators and the hand predictor.
//!
//! Every feature tuple is laid out from the deciding player's point of view:
//! per-seat rows (beliefs, hand sizes, coins) are reordered so the decider
//! comes first, and targets are expressed relative to the decider. The slot
//! order of each tuple is a fixed contract with the evaluators:
//!
//! | tuple | slots |
//! |---|---|
//! | action | in-play, own hand, beliefs, sizes, coins, noise, action `[7]`, target `[5]` |
//! | block | in-play, own hand, beliefs, sizes, coins, noise, option `[1]` or `[2]` |
//! | challenge | in-play, own hand, beliefs, sizes, coins, noise, claim `[8]`, decision `[1]` |
//! | hand predictor | in-play, beliefs, sizes, coins, action `[21]`, target `[5]` |

use crate::belief::HandBeliefState;
use crate::core::{
    Action, ActiveAction, PlayerId, NUM_ACTIONS, NUM_ACTIVE_ACTIONS, NUM_CHALLENGEABLE_ACTIONS,
    NUM_RELATIVE_TARGETS,
};
use crate::games::coup::CoupGame;
use crate::nn::traits::{EncodedState, FeatureTuple};

/// Number of slots shared by the action, block and challenge tuples.
pub const SHARED_SLOTS: usize = 6;

/// Indicator vector of width `width` with `index` set, or all zeros.
#[must_use]
pub fn one_hot(index: Option<usize>, width: usize) -> Vec<f32> {
    let mut encoded = vec![0.0; width];
    if let Some(slot) = index.and_then(|i| encoded.get_mut(i)) {
        *slot = 1.0;
    }
    encoded
}

/// Reorder `rows` so row `k` comes first.
///
/// Position `p` of the result holds row `(k - p) mod n`. The reordering is
/// its own inverse, and it agrees with [`PlayerId::canonical_position`], so
/// a relative target `r` addresses row `r + 1` of the result.
///
/// # Panics
/// Panics if `k >= rows.len()`.
#[must_use]
pub fn row_to_first<T: Clone>(rows: &[T], k: usize) -> Vec<T> {
    let n = rows.len();
    assert!(k < n, "row {k} out of range for {n} rows");
    (0..n).map(|p| rows[(k + n - p) % n].clone()).collect()
}

/// Cyclic shift applied to the remaining rows by [`rows_to_first_second`].
///
/// `5^first * 7^second mod (n - 2)`, or 0 when no rows remain.
#[must_use]
pub fn permutation_shift(n: usize, first: usize, second: usize) -> usize {
    let modulus = n.saturating_sub(2);
    if modulus == 0 {
        return 0;
    }
    (pow_mod(5, first, modulus) * pow_mod(7, second, modulus)) % modulus
}

fn pow_mod(base: usize, exp: usize, modulus: usize) -> usize {
    let mut result = 1 % modulus;
    let mut base = base % modulus;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exp >>= 1;
    }
    result
}

/// Reorder `rows` as `[first, second, rest...]`.
///
/// The rest keep their relative order, rotated right by
/// [`permutation_shift`], so the layout depends on the two indices only.
///
/// # Panics
/// Panics if the indices are equal or out of range.
#[must_use]
pub fn rows_to_first_second<T: Clone>(rows: &[T], first: usize, second: usize) -> Vec<T> {
    let n = rows.len();
    assert!(first < n && second < n, "rows ({first}, {second}) out of range for {n} rows");
    assert_ne!(first, second, "rows_to_first_second needs two distinct rows");

    let mut rest: Vec<T> = rows
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != first && i != second)
        .map(|(_, row)| row.clone())
        .collect();
    if !rest.is_empty() {
        let shift = permutation_shift(n, first, second) % rest.len();
        rest.rotate_right(shift);
    }

    let mut out = Vec::with_capacity(n);
    out.push(rows[first].clone());
    out.push(rows[second].clone());
    out.extend(rest);
    out
}

/// Whose point of view a tuple's per-seat rows are arranged for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Viewpoint {
    /// A player deciding alone (action choice, hand prediction).
    Own(PlayerId),
    /// A player deciding against one opponent (block, challenge).
    Versus {
        decider: PlayerId,
        opponent: PlayerId,
    },
}

impl Viewpoint {
    /// The deciding player.
    #[must_use]
    pub fn decider(self) -> PlayerId {
        match self {
            Viewpoint::Own(player) | Viewpoint::Versus { decider: player, .. } => player,
        }
    }

    /// Apply this viewpoint's row ordering.
    #[must_use]
    pub fn arrange<T: Clone>(self, rows: &[T]) -> Vec<T> {
        match self {
            Viewpoint::Own(player) => row_to_first(rows, player.index()),
            Viewpoint::Versus { decider, opponent } => {
                rows_to_first_second(rows, decider.index(), opponent.index())
            }
        }
    }
}

/// Builds feature tuples from the current table and belief state.
#[derive(Clone, Copy, Debug)]
pub struct FeatureEncoder<'a> {
    game: &'a CoupGame,
    beliefs: &'a HandBeliefState,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(game: &'a CoupGame, beliefs: &'a HandBeliefState) -> Self {
        Self { game, beliefs }
    }

    fn beliefs(&self, viewpoint: Viewpoint) -> EncodedState {
        EncodedState::matrix(&viewpoint.arrange(self.beliefs.rows()))
    }

    fn hand_sizes(&self, viewpoint: Viewpoint) -> EncodedState {
        EncodedState::vector(viewpoint.arrange(&self.game.hand_sizes()))
    }

    fn coins(&self, viewpoint: Viewpoint) -> EncodedState {
        EncodedState::vector(viewpoint.arrange(&self.game.coins_row()))
    }

    /// The six slots shared by action, block and challenge tuples.
    pub fn decision_state(&self, viewpoint: Viewpoint, noise: &[f32]) -> FeatureTuple {
        vec![
            EncodedState::vector(self.game.count_inplay()),
            EncodedState::vector(self.game.one_hot_hand(viewpoint.decider())),
            self.beliefs(viewpoint),
            self.hand_sizes(viewpoint),
            self.coins(viewpoint),
            EncodedState::vector(noise),
        ]
    }

    /// Hand predictor input for one observed event.
    ///
    /// A recorded failure to block negates the action one-hot.
    pub fn hand_prediction(
        &self,
        player: PlayerId,
        action: Action,
        target: Option<PlayerId>,
        failed_to_block: bool,
    ) -> FeatureTuple {
        let viewpoint = Viewpoint::Own(player);
        let mut action_slot = EncodedState::vector(one_hot(Some(action.code()), NUM_ACTIONS));
        if failed_to_block {
            action_slot = action_slot.negated();
        }
        let relative = target.and_then(|t| t.relative_to(player));

        vec![
            EncodedState::vector(self.game.count_inplay()),
            self.beliefs(viewpoint),
            self.hand_sizes(viewpoint),
            self.coins(viewpoint),
            action_slot,
            EncodedState::vector(one_hot(relative, NUM_RELATIVE_TARGETS)),
        ]
    }
}

/// Option slots of an action tuple: `action` aimed at `target`, as seen by
/// `actor`.
#[must_use]
pub fn action_option(actor: PlayerId, action: ActiveAction, target: PlayerId) -> [EncodedState; 2] {
    [
        EncodedState::vector(one_hot(Some(action.index()), NUM_ACTIVE_ACTIONS)),
        EncodedState::vector(one_hot(target.relative_to(actor), NUM_RELATIVE_TARGETS)),
    ]
}

/// Option slots of a challenge tuple.
#[must_use]
pub fn challenge_option(claim_index: usize, challenge: bool) -> [EncodedState; 2] {
    [
        EncodedState::vector(one_hot(Some(claim_index), NUM_CHALLENGEABLE_ACTIONS)),
        EncodedState::vector(vec![if challenge { 1.0 } else { 0.0 }]),
    ]
}

/// `base` followed by `option`.
#[must_use]
pub fn with_option(
    base: &FeatureTuple,
    option: impl IntoIterator<Item = EncodedState>,
) -> FeatureTuple {
    let mut tuple = base.clone();
    tuple.extend(option);
    tuple
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, GameRng, MAX_PLAYERS};
    use smallvec::smallvec;

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(Some(2), 4), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(one_hot(None, 3), vec![0.0; 3]);
        assert_eq!(one_hot(Some(9), 3), vec![0.0; 3]);
    }

    #[test]
    fn test_row_to_first() {
        let rows = [0, 1, 2, 3, 4, 5];
        assert_eq!(row_to_first(&rows, 0), vec![0, 5, 4, 3, 2, 1]);
        assert_eq!(row_to_first(&rows, 2), vec![2, 1, 0, 5, 4, 3]);
        assert_eq!(row_to_first(&row_to_first(&rows, 4), 4), rows.to_vec());
    }

    #[test]
    fn test_row_to_first_matches_relative_targets() {
        let rows: Vec<usize> = (0..MAX_PLAYERS).collect();
        for k in 0..MAX_PLAYERS {
            let perspective = PlayerId::new(k as u8);
            let arranged = row_to_first(&rows, k);
            for relative in 0..NUM_RELATIVE_TARGETS {
                let seat = PlayerId::from_relative(perspective, relative);
                assert_eq!(arranged[relative + 1], seat.index());
            }
        }
    }

    #[test]
    fn test_rows_to_first_second() {
        let rows = [0, 1, 2, 3, 4, 5];
        // shift = 5^1 * 7^3 mod 4 = 1715 mod 4 = 3
        assert_eq!(permutation_shift(6, 1, 3), 3);
        assert_eq!(rows_to_first_second(&rows, 1, 3), vec![1, 3, 2, 4, 5, 0]);

        let out = rows_to_first_second(&rows, 5, 0);
        assert_eq!(&out[..2], &[5, 0]);
        let mut rest = out[2..].to_vec();
        rest.sort_unstable();
        assert_eq!(rest, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rows_to_first_second_two_rows() {
        assert_eq!(permutation_shift(2, 1, 0), 0);
        assert_eq!(rows_to_first_second(&[7, 8], 1, 0), vec![8, 7]);
    }

    #[test]
    #[should_panic(expected = "two distinct rows")]
    fn test_rows_to_first_second_rejects_same_row() {
        let _ = rows_to_first_second(&[1, 2, 3], 1, 1);
    }

    #[test]
    fn test_decision_state_layout() {
        let mut game = CoupGame::new(3, GameRng::new(1));
        game.hands[PlayerId::new(1)] = smallvec![Card::Captain, Card::Contessa];
        game.player_coins[PlayerId::new(1)] = 5;
        let beliefs = HandBeliefState::new(0.4);
        let encoder = FeatureEncoder::new(&game, &beliefs);

        let tuple = encoder.decision_state(Viewpoint::Own(PlayerId::new(1)), &[0.5; 5]);
        assert_eq!(tuple.len(), SHARED_SLOTS);
        assert_eq!(tuple[1].tensor, vec![0.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(tuple[2].shape, vec![MAX_PLAYERS, 5]);
        // Own coins first, then seat 0, then padding, then seat 2.
        assert_eq!(tuple[4].tensor, vec![5.0, 2.0, 0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_hand_prediction_layout() {
        let game = CoupGame::new(2, GameRng::new(1));
        let beliefs = HandBeliefState::new(0.4);
        let encoder = FeatureEncoder::new(&game, &beliefs);

        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let tuple = encoder.hand_prediction(p0, ActiveAction::Steal.into(), Some(p1), false);
        assert_eq!(tuple.len(), 6);
        assert_eq!(tuple[4].tensor[ActiveAction::Steal.index()], 1.0);
        assert_eq!(tuple[5].tensor, one_hot(p1.relative_to(p0), NUM_RELATIVE_TARGETS));

        let block = Action::Block(crate::core::Block::Assassinate);
        let failed = encoder.hand_prediction(p1, block, None, true);
        assert_eq!(failed[4].tensor[Action::Block(crate::core::Block::Assassinate).code()], -1.0);
        assert_eq!(failed[5].tensor, vec![0.0; NUM_RELATIVE_TARGETS]);
    }

    #[test]
    fn test_option_slots() {
        let actor = PlayerId::new(0);
        let [action, target] = action_option(actor, ActiveAction::Coup, PlayerId::new(2));
        assert_eq!(action.tensor, one_hot(Some(2), NUM_ACTIVE_ACTIONS));
        // Seat 2 sits at canonical position 4 from seat 0.
        assert_eq!(target.tensor, one_hot(Some(3), NUM_RELATIVE_TARGETS));

        let [claim, decision] = challenge_option(5, true);
        assert_eq!(claim.shape, vec![NUM_CHALLENGEABLE_ACTIONS]);
        assert_eq!(decision.tensor, vec![1.0]);
    }
}
