//! Integration tests for training cycles, belief updates and self-play.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use coup_selfplay::core::{ActiveAction, PlayerId, TrainerConfig};
use coup_selfplay::error::{EvaluatorError, TrainingError};
use coup_selfplay::nn::{
    ConstantEvaluator, EncodedState, Evaluator, FeatureBatch, FitOptions,
};
use coup_selfplay::training::{
    DecisionType, EvaluatorSet, GameTrainingWrapper, SelfPlayConfig, SelfPlayWorker,
    TurnOutcome, DRAW_REWARD,
};

// =============================================================================
// Helpers
// =============================================================================

/// Constant scores; remembers every label it was fit on.
struct Recording {
    inner: ConstantEvaluator,
    fits: Rc<RefCell<Vec<Vec<f32>>>>,
}

impl Evaluator for Recording {
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        self.inner.predict(x)
    }

    fn fit(
        &mut self,
        x: &FeatureBatch,
        y: &[f32],
        _options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        assert_eq!(x.len(), y.len());
        self.fits.borrow_mut().push(y.to_vec());
        Ok(())
    }
}

/// Fails every call.
struct Broken;

impl Evaluator for Broken {
    fn predict(&self, _x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        Err(EvaluatorError::Backend("model not loaded".into()))
    }

    fn fit(
        &mut self,
        _x: &FeatureBatch,
        _y: &[f32],
        _options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        Err(EvaluatorError::Backend("model not loaded".into()))
    }
}

/// Predicts the same hand row for every event.
struct FixedHand([f32; 5]);

impl Evaluator for FixedHand {
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        Ok(self.0.repeat(x.len()))
    }

    fn fit(
        &mut self,
        _x: &FeatureBatch,
        _y: &[f32],
        _options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        Ok(())
    }
}

/// Fails to fit while `failing` is set; remembers labels it did fit on.
struct Flaky {
    failing: Rc<Cell<bool>>,
    fits: Rc<RefCell<Vec<Vec<f32>>>>,
}

impl Evaluator for Flaky {
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        Ok(vec![0.5; x.len()])
    }

    fn fit(
        &mut self,
        _x: &FeatureBatch,
        y: &[f32],
        _options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        if self.failing.get() {
            return Err(EvaluatorError::Backend("out of memory".into()));
        }
        self.fits.borrow_mut().push(y.to_vec());
        Ok(())
    }
}

fn config(players: usize) -> TrainerConfig {
    TrainerConfig::new(players).with_epsilon(0.0).with_seed(5)
}

// =============================================================================
// Training Cycle Tests
// =============================================================================

#[test]
fn test_train_all_evaluators_fits_completed_samples_only() {
    let fits = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&fits);
    let evaluators = EvaluatorSet::from_fn(move |decision| -> Box<dyn Evaluator> {
        match decision {
            DecisionType::Action => Box::new(Recording {
                inner: ConstantEvaluator::new(0.25),
                fits: Rc::clone(&log),
            }),
            DecisionType::HandPrediction => Box::new(ConstantEvaluator::with_width(0.4, 5)),
            _ => Box::new(ConstantEvaluator::default()),
        }
    });
    let mut wrapper = GameTrainingWrapper::new(config(2), evaluators).unwrap();

    // Nothing is labelled before anyone's second turn.
    wrapper.take_turn().unwrap();
    wrapper.take_turn().unwrap();
    assert_eq!(wrapper.train_all_evaluators().unwrap(), [0; 6]);
    assert!(fits.borrow().is_empty());

    wrapper.take_turn().unwrap();
    wrapper.take_turn().unwrap();
    let trained = wrapper.train_all_evaluators().unwrap();
    assert_eq!(trained[DecisionType::Action.index()], 2);
    assert_eq!(*fits.borrow(), vec![vec![0.25, 0.25]]);

    // The two newest decisions are still pending.
    assert_eq!(wrapper.ledger().num_inputs(DecisionType::Action), 2);
    assert_eq!(wrapper.ledger().num_outputs(DecisionType::Action), 0);
}

#[test]
fn test_failed_fit_keeps_samples() {
    let failing = Rc::new(Cell::new(true));
    let fits = Rc::new(RefCell::new(Vec::new()));
    let (flag, log) = (Rc::clone(&failing), Rc::clone(&fits));
    let evaluators = EvaluatorSet::from_fn(move |decision| -> Box<dyn Evaluator> {
        match decision {
            DecisionType::Action => Box::new(Flaky {
                failing: Rc::clone(&flag),
                fits: Rc::clone(&log),
            }),
            DecisionType::HandPrediction => Box::new(ConstantEvaluator::with_width(0.4, 5)),
            _ => Box::new(ConstantEvaluator::default()),
        }
    });
    let mut wrapper = GameTrainingWrapper::new(config(2), evaluators).unwrap();
    for _ in 0..4 {
        wrapper.take_turn().unwrap();
    }

    let err = wrapper.train_all_evaluators().unwrap_err();
    assert!(matches!(err, TrainingError::Evaluator(EvaluatorError::Backend(_))));
    assert_eq!(wrapper.ledger().num_inputs(DecisionType::Action), 4);
    assert_eq!(wrapper.ledger().num_outputs(DecisionType::Action), 2);
    for player in PlayerId::all(2) {
        let queue = wrapper.ledger().queue(DecisionType::Action, player);
        assert_eq!(queue.num_inputs(), 2);
        assert_eq!(queue.num_outputs(), 1);
    }

    failing.set(false);
    let trained = wrapper.train_all_evaluators().unwrap();
    assert_eq!(trained[DecisionType::Action.index()], 2);
    assert_eq!(*fits.borrow(), vec![vec![0.5, 0.5]]);
    assert_eq!(wrapper.ledger().num_inputs(DecisionType::Action), 2);
    assert_eq!(wrapper.ledger().num_outputs(DecisionType::Action), 0);
}

#[test]
fn test_flush_survivors_labels_pending_decisions() {
    let mut wrapper = GameTrainingWrapper::new(config(3), EvaluatorSet::constant()).unwrap();
    for _ in 0..3 {
        wrapper.take_turn().unwrap();
    }

    assert_eq!(wrapper.flush_survivors(DRAW_REWARD), 3);
    for player in PlayerId::all(3) {
        assert!(wrapper.ledger().is_settled(player));
        assert_eq!(
            wrapper.ledger().queue(DecisionType::Action, player).last_output(),
            Some(DRAW_REWARD)
        );
    }
}

#[test]
fn test_evaluator_failure_is_reported() {
    let evaluators = EvaluatorSet::from_fn(|decision| -> Box<dyn Evaluator> {
        match decision {
            DecisionType::Action => Box::new(Broken),
            _ => Box::new(ConstantEvaluator::default()),
        }
    });
    let mut wrapper = GameTrainingWrapper::new(config(2), evaluators).unwrap();

    let err = wrapper.take_turn().unwrap_err();
    assert!(matches!(err, TrainingError::Evaluator(EvaluatorError::Backend(_))));
    assert_eq!(wrapper.ledger().num_inputs(DecisionType::Action), 0);
}

#[test]
fn test_wrong_prediction_width_is_reported() {
    let evaluators = EvaluatorSet::from_fn(|decision| -> Box<dyn Evaluator> {
        match decision {
            DecisionType::Action => Box::new(ConstantEvaluator::with_width(0.5, 2)),
            _ => Box::new(ConstantEvaluator::default()),
        }
    });
    let mut wrapper = GameTrainingWrapper::new(config(2), evaluators).unwrap();

    let err = wrapper.take_turn().unwrap_err();
    assert!(matches!(
        err,
        TrainingError::Evaluator(EvaluatorError::OutputCount { .. })
    ));
}

// =============================================================================
// Belief Tests
// =============================================================================

#[test]
fn test_hand_predictor_overwrites_actor_row() {
    let hand = [0.9, 0.1, 0.0, 0.2, 0.3];
    let evaluators = EvaluatorSet::from_fn(|decision| -> Box<dyn Evaluator> {
        match decision {
            DecisionType::HandPrediction => Box::new(FixedHand(hand)),
            _ => Box::new(ConstantEvaluator::default()),
        }
    });
    let mut wrapper = GameTrainingWrapper::new(config(3), evaluators).unwrap();

    let report = wrapper.take_turn().unwrap();
    assert_eq!(report.action, ActiveAction::Income);
    assert_eq!(report.belief_events.len(), 1);
    assert_eq!(
        report.belief_events[0].resulting_hand,
        wrapper.game().one_hot_hand(PlayerId::new(0))
    );

    assert_eq!(wrapper.beliefs().row(PlayerId::new(0)), &hand);
    assert_eq!(wrapper.beliefs().row(PlayerId::new(1)), &[0.4; 5]);
}

#[test]
fn test_evaluator_set_constructors() {
    let set = EvaluatorSet::constant();
    let batch = FeatureBatch::from_samples(&[vec![EncodedState::vector(vec![1.0])]]);
    assert_eq!(set.get(DecisionType::Action).predict(&batch).unwrap(), vec![0.5]);
    assert_eq!(
        set.get(DecisionType::HandPrediction).predict(&batch).unwrap(),
        vec![0.4; 5]
    );
}

// =============================================================================
// Self-Play Tests
// =============================================================================

#[test]
fn test_self_play_games_end_settled() {
    let mut worker = SelfPlayWorker::new(
        TrainerConfig::new(4).with_epsilon(0.3).with_seed(21),
        SelfPlayConfig::new().with_max_turns(150).with_train_interval(25),
        EvaluatorSet::tabular(),
    )
    .unwrap();

    let summaries = worker.play_games(4).unwrap();
    let seeds: Vec<u64> = summaries.iter().map(|s| s.seed).collect();
    assert_eq!(seeds, vec![21, 22, 23, 24]);

    for summary in &summaries {
        assert!(summary.turns <= 150);
        assert_eq!(summary.completed, summary.winner.is_some());
        assert_eq!(summary.trained[DecisionType::HandPrediction.index()], 0);
    }

    // Every label was consumed by the final training pass.
    let ledger = worker.wrapper().ledger();
    for decision in DecisionType::ALL {
        assert_eq!(ledger.num_outputs(decision), 0);
    }
}

#[test]
fn test_self_play_game_over_flag() {
    let mut wrapper = GameTrainingWrapper::new(
        TrainerConfig::new(2).with_epsilon(1.0).with_seed(9),
        EvaluatorSet::constant(),
    )
    .unwrap();

    let mut turns = 0;
    loop {
        turns += 1;
        let report = wrapper.take_turn().unwrap();
        if let TurnOutcome::GameOver { winner } = report.outcome {
            assert!(winner.is_some());
            break;
        }
        assert!(turns < 1000, "random play should finish a two-player game");
    }
    assert!(wrapper.is_finished());
}
