//! Belief updates through the hand predictor.
//!
//! Every observable event about a player (an action taken, a block not made,
//! a card lost or reshuffled) is a `BeliefEvent`. A batch of events is
//! encoded against the current beliefs, sent through the hand predictor's
//! `fit_predict` with the players' true hands as targets, and the predictions
//! replace the players' belief rows.

use tracing::trace;

use super::state::HandBeliefState;
use crate::core::{Action, PlayerId, CARD_TYPES};
use crate::error::EvaluatorError;
use crate::games::coup::CoupGame;
use crate::nn::{Evaluator, FeatureBatch, FeatureEncoder, FitOptions};

/// One observed event about `player`'s hand.
#[derive(Clone, Debug, PartialEq)]
pub struct BeliefEvent {
    pub player: PlayerId,
    pub action: Action,
    /// Target of a targeting action, absolute seat.
    pub target: Option<PlayerId>,
    /// The event records that `player` did *not* make this block.
    pub failed_to_block: bool,
    /// `player`'s true hand after the event, as a card indicator vector.
    pub resulting_hand: [f32; CARD_TYPES],
}

impl BeliefEvent {
    /// An untargeted event.
    pub fn observed(
        player: PlayerId,
        action: impl Into<Action>,
        resulting_hand: [f32; CARD_TYPES],
    ) -> Self {
        Self {
            player,
            action: action.into(),
            target: None,
            failed_to_block: false,
            resulting_hand,
        }
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: Option<PlayerId>) -> Self {
        self.target = target;
        self
    }

    /// Mark as a block the player declined to make.
    #[must_use]
    pub fn declined(mut self) -> Self {
        self.failed_to_block = true;
        self
    }
}

/// Run `events` through the hand predictor and store the new beliefs.
///
/// All events are encoded against the beliefs as they stand before the
/// batch. When one player appears more than once the last prediction wins.
pub fn update_beliefs(
    beliefs: &mut HandBeliefState,
    game: &CoupGame,
    predictor: &mut dyn Evaluator,
    events: &[BeliefEvent],
    options: &FitOptions,
) -> Result<(), EvaluatorError> {
    if events.is_empty() {
        return Ok(());
    }

    let encoder = FeatureEncoder::new(game, beliefs);
    let samples: Vec<_> = events
        .iter()
        .map(|e| encoder.hand_prediction(e.player, e.action, e.target, e.failed_to_block))
        .collect();
    let x = FeatureBatch::from_samples(&samples);
    let y: Vec<f32> = events.iter().flat_map(|e| e.resulting_hand).collect();

    let predictions = predictor.fit_predict(&x, &y, options)?;
    let expected = events.len() * CARD_TYPES;
    if predictions.len() != expected {
        return Err(EvaluatorError::OutputCount {
            expected,
            got: predictions.len(),
        });
    }

    for (event, row) in events.iter().zip(predictions.chunks_exact(CARD_TYPES)) {
        trace!(player = %event.player, action = ?event.action, belief = ?row, "belief update");
        beliefs.set_row(event.player, row);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActiveAction, Card, GameRng};
    use crate::nn::ConstantEvaluator;

    /// Echoes the training targets back as predictions.
    struct Oracle {
        fitted: usize,
    }

    impl Evaluator for Oracle {
        fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
            Ok(vec![0.0; x.len() * CARD_TYPES])
        }

        fn fit(
            &mut self,
            x: &FeatureBatch,
            _y: &[f32],
            _options: &FitOptions,
        ) -> Result<(), EvaluatorError> {
            self.fitted += x.len();
            Ok(())
        }

        fn fit_predict(
            &mut self,
            x: &FeatureBatch,
            y: &[f32],
            options: &FitOptions,
        ) -> Result<Vec<f32>, EvaluatorError> {
            self.fit(x, y, options)?;
            Ok(y.to_vec())
        }
    }

    #[test]
    fn test_update_sets_rows() {
        let game = CoupGame::new(3, GameRng::new(3));
        let mut beliefs = HandBeliefState::new(0.4);
        let mut oracle = Oracle { fitted: 0 };

        let hand = [1.0, 0.0, 0.0, 0.0, 1.0];
        let events = vec![
            BeliefEvent::observed(PlayerId::new(1), ActiveAction::Tax, hand),
            BeliefEvent::observed(PlayerId::new(2), Action::Lose(Card::Duke), [0.0; CARD_TYPES]),
        ];
        update_beliefs(&mut beliefs, &game, &mut oracle, &events, &FitOptions::default()).unwrap();

        assert_eq!(oracle.fitted, 2);
        assert_eq!(beliefs.row(PlayerId::new(1)), &hand);
        assert_eq!(beliefs.row(PlayerId::new(2)), &[0.0; CARD_TYPES]);
        assert_eq!(beliefs.row(PlayerId::new(0)), &[0.4; CARD_TYPES]);
    }

    #[test]
    fn test_update_rejects_wrong_width() {
        let game = CoupGame::new(2, GameRng::new(3));
        let mut beliefs = HandBeliefState::new(0.4);
        let mut scalar = ConstantEvaluator::new(0.5);

        let hand = [0.0; CARD_TYPES];
        let events = vec![BeliefEvent::observed(PlayerId::new(0), ActiveAction::Income, hand)];
        let err = update_beliefs(&mut beliefs, &game, &mut scalar, &events, &FitOptions::default())
            .unwrap_err();
        assert_eq!(err, EvaluatorError::OutputCount { expected: 5, got: 1 });
        assert_eq!(beliefs.row(PlayerId::new(0)), &[0.4; CARD_TYPES]);
    }

    #[test]
    fn test_empty_batch_skips_predictor() {
        let game = CoupGame::new(2, GameRng::new(3));
        let mut beliefs = HandBeliefState::new(0.4);
        let mut oracle = Oracle { fitted: 0 };
        update_beliefs(&mut beliefs, &game, &mut oracle, &[], &FitOptions::default()).unwrap();
        assert_eq!(oracle.fitted, 0);
    }
}
