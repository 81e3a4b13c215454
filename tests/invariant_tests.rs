//! Property tests for encoding layouts, decision queues and whole games.

use proptest::prelude::*;

use coup_selfplay::core::{PlayerId, TrainerConfig};
use coup_selfplay::nn::{row_to_first, rows_to_first_second, EncodedState};
use coup_selfplay::training::{
    DecisionQueue, DecisionType, EvaluatorSet, GameTrainingWrapper, TurnOutcome,
};

fn sorted(mut rows: Vec<usize>) -> Vec<usize> {
    rows.sort_unstable();
    rows
}

proptest! {
    // =========================================================================
    // Canonicalization
    // =========================================================================

    #[test]
    fn prop_row_to_first_is_an_involution(n in 2usize..=6, k in 0usize..6) {
        let k = k % n;
        let rows: Vec<usize> = (0..n).collect();
        let arranged = row_to_first(&rows, k);

        prop_assert_eq!(arranged[0], k);
        prop_assert_eq!(sorted(arranged.clone()), rows.clone());
        prop_assert_eq!(row_to_first(&arranged, k), rows);
    }

    #[test]
    fn prop_rows_to_first_second_is_a_permutation(n in 2usize..=6, a in 0usize..6, b in 0usize..6) {
        let (first, second) = (a % n, b % n);
        prop_assume!(first != second);
        let rows: Vec<usize> = (0..n).collect();
        let arranged = rows_to_first_second(&rows, first, second);

        prop_assert_eq!(arranged[0], first);
        prop_assert_eq!(arranged[1], second);
        prop_assert_eq!(sorted(arranged), rows);
    }

    // =========================================================================
    // Decision Queues
    // =========================================================================

    #[test]
    fn prop_queue_labels_never_outrun_inputs(ops in proptest::collection::vec(0u8..3, 0..40)) {
        let mut queue = DecisionQueue::new();
        let mut appended = 0usize;
        let mut collected = 0usize;

        for (i, op) in ops.into_iter().enumerate() {
            match op {
                0 => {
                    queue.append_inputs(vec![EncodedState::vector(vec![i as f32])]);
                    appended += 1;
                }
                1 => {
                    queue.backfill(i as f32);
                }
                _ => {
                    if let Some(done) = queue.read_complete_data() {
                        prop_assert_eq!(done.inputs.len(), done.labels.len());
                        collected += done.labels.len();
                    }
                }
            }
            prop_assert!(queue.num_outputs() <= queue.num_inputs());
            prop_assert_eq!(queue.num_inputs() + collected, appended);
        }
    }

    #[test]
    fn prop_labels_follow_input_order(count in 1usize..10, split in 0usize..10) {
        let split = split % count;
        let mut queue = DecisionQueue::new();
        for i in 0..split {
            queue.append_inputs(vec![EncodedState::vector(vec![i as f32])]);
        }
        queue.backfill(1.0);
        for i in split..count {
            queue.append_inputs(vec![EncodedState::vector(vec![i as f32])]);
        }
        queue.backfill(2.0);

        let done = queue.read_complete_data().unwrap();
        for (i, (input, label)) in done.inputs.iter().zip(&done.labels).enumerate() {
            prop_assert_eq!(input[0].tensor[0], i as f32);
            prop_assert_eq!(*label, if i < split { 1.0 } else { 2.0 });
        }
    }
}

// =============================================================================
// Whole Games
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_game_invariants_hold_every_turn(players in 2usize..=6, seed in any::<u64>()) {
        let config = TrainerConfig::new(players).with_epsilon(0.5).with_seed(seed);
        let mut wrapper = GameTrainingWrapper::new(config, EvaluatorSet::tabular()).unwrap();

        for _ in 0..80 {
            let report = wrapper.take_turn().unwrap();
            let game = wrapper.game();

            prop_assert_eq!(game.total_cards(), 15);
            for player in PlayerId::all(players) {
                prop_assert!(game.player_coins[player] >= 0);
                prop_assert!(game.hands[player].len() <= 2);
                if !game.is_alive(player) {
                    prop_assert!(wrapper.ledger().is_settled(player));
                    prop_assert_eq!(wrapper.beliefs().row(player), &[0.0; 5]);
                }
                for value in wrapper.beliefs().row(player) {
                    prop_assert!((0.0..=1.0).contains(value));
                }
            }
            for decision in DecisionType::ALL {
                prop_assert!(
                    wrapper.ledger().num_outputs(decision) <= wrapper.ledger().num_inputs(decision)
                );
            }

            if let TurnOutcome::GameOver { winner } = report.outcome {
                for player in PlayerId::all(players) {
                    prop_assert!(wrapper.ledger().is_settled(player));
                }
                if let Some(winner) = winner {
                    prop_assert!(wrapper.game().is_alive(winner));
                }
                break;
            }
        }
    }
}
