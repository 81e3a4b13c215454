//! Training wrapper bindings for Python.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::{PlayerId, TrainerConfig};
use crate::error::{ConfigError, TrainingError};
use crate::nn::{Evaluator, FitOptions};
use crate::training::{DecisionType, EvaluatorSet, GameTrainingWrapper, TurnOutcome, TurnReport};

use super::py_evaluator::PyEvaluator;

pub(super) fn config_error(err: ConfigError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

pub(super) fn training_error(err: TrainingError) -> PyErr {
    match err {
        TrainingError::Config(err) => config_error(err),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

fn decision_type(name: &str) -> PyResult<DecisionType> {
    DecisionType::from_name(name)
        .ok_or_else(|| PyValueError::new_err(format!("unknown decision type {name:?}")))
}

/// Wrap six Python models, in `DecisionType::ALL` order.
pub(super) fn evaluator_set(models: [PyObject; DecisionType::COUNT]) -> EvaluatorSet {
    let wrap = |model, decision: DecisionType| -> Box<dyn Evaluator> {
        Box::new(PyEvaluator::new(model, decision.name()))
    };
    let [action, assassinate, foreign_aid, steal, challenge, hand] = models;
    EvaluatorSet::new(
        wrap(action, DecisionType::Action),
        wrap(assassinate, DecisionType::AssassinateBlock),
        wrap(foreign_aid, DecisionType::ForeignAidBlock),
        wrap(steal, DecisionType::StealBlock),
        wrap(challenge, DecisionType::Challenge),
        wrap(hand, DecisionType::HandPrediction),
    )
}

pub(super) fn trainer_config(
    num_players: usize,
    epsilon: f64,
    seed: u64,
    batch_size: usize,
    epochs: usize,
    verbose: u8,
) -> TrainerConfig {
    TrainerConfig::new(num_players)
        .with_epsilon(epsilon)
        .with_seed(seed)
        .with_fit_options(FitOptions {
            batch_size,
            epochs,
            verbose,
        })
}

/// Summary of one turn.
#[pyclass(name = "TurnReport")]
#[derive(Clone)]
pub struct PyTurnReport(pub TurnReport);

#[pymethods]
impl PyTurnReport {
    #[getter]
    fn actor(&self) -> usize {
        self.0.actor.index()
    }

    /// Name of the action taken.
    #[getter]
    fn action(&self) -> String {
        self.0.action.to_string()
    }

    #[getter]
    fn target(&self) -> Option<usize> {
        self.0.target.map(PlayerId::index)
    }

    #[getter]
    fn expected_reward(&self) -> f32 {
        self.0.expected_reward
    }

    #[getter]
    fn backfilled_reward(&self) -> f32 {
        self.0.backfilled_reward
    }

    #[getter]
    fn eliminated(&self) -> Vec<usize> {
        self.0.eliminated.iter().map(|p| p.index()).collect()
    }

    #[getter]
    fn game_over(&self) -> bool {
        matches!(self.0.outcome, TurnOutcome::GameOver { .. })
    }

    #[getter]
    fn winner(&self) -> Option<usize> {
        match self.0.outcome {
            TurnOutcome::GameOver { winner } => winner.map(PlayerId::index),
            TurnOutcome::Continue => None,
        }
    }

    /// True while the game goes on.
    fn __bool__(&self) -> bool {
        !self.game_over()
    }

    fn __repr__(&self) -> String {
        format!(
            "TurnReport(actor={}, action={}, target={:?}, game_over={})",
            self.0.actor.index(),
            self.0.action,
            self.0.target.map(PlayerId::index),
            self.game_over()
        )
    }
}

/// Python wrapper for GameTrainingWrapper.
///
/// Holds Python models, so it stays on the thread that created it.
#[pyclass(name = "GameTrainingWrapper", unsendable)]
pub struct PyGameTrainingWrapper {
    inner: GameTrainingWrapper,
}

#[pymethods]
impl PyGameTrainingWrapper {
    /// Deal a new game. Each model needs Keras-style `predict` and `fit`.
    #[new]
    #[pyo3(signature = (
        num_players,
        action_evaluator,
        assassinate_block_evaluator,
        foreign_aid_block_evaluator,
        steal_block_evaluator,
        challenge_evaluator,
        hand_predictor,
        epsilon = 0.1,
        seed = 42,
        batch_size = 32,
        epochs = 1,
        verbose = 0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_players: usize,
        action_evaluator: PyObject,
        assassinate_block_evaluator: PyObject,
        foreign_aid_block_evaluator: PyObject,
        steal_block_evaluator: PyObject,
        challenge_evaluator: PyObject,
        hand_predictor: PyObject,
        epsilon: f64,
        seed: u64,
        batch_size: usize,
        epochs: usize,
        verbose: u8,
    ) -> PyResult<Self> {
        let evaluators = evaluator_set([
            action_evaluator,
            assassinate_block_evaluator,
            foreign_aid_block_evaluator,
            steal_block_evaluator,
            challenge_evaluator,
            hand_predictor,
        ]);
        let config = trainer_config(num_players, epsilon, seed, batch_size, epochs, verbose);
        let inner = GameTrainingWrapper::new(config, evaluators).map_err(config_error)?;
        Ok(Self { inner })
    }

    /// Play one turn.
    fn take_turn(&mut self) -> PyResult<PyTurnReport> {
        self.inner
            .take_turn()
            .map(PyTurnReport)
            .map_err(training_error)
    }

    /// Fit every model on its completed samples; returns samples per decision type.
    fn train_all_evaluators(&mut self) -> PyResult<Vec<usize>> {
        self.inner
            .train_all_evaluators()
            .map(Vec::from)
            .map_err(training_error)
    }

    /// Start a fresh game, keeping the models.
    fn new_game(&mut self, seed: u64) {
        self.inner.new_game(seed);
    }

    /// Label the survivors' pending decisions, e.g. when abandoning a game.
    fn flush_survivors(&mut self, reward: f32) -> usize {
        self.inner.flush_survivors(reward)
    }

    /// Queued inputs for `decision`, summed over players.
    fn num_inputs(&self, decision: &str) -> PyResult<usize> {
        Ok(self.inner.ledger().num_inputs(decision_type(decision)?))
    }

    /// Queued labels for `decision`, summed over players.
    fn num_outputs(&self, decision: &str) -> PyResult<usize> {
        Ok(self.inner.ledger().num_outputs(decision_type(decision)?))
    }

    /// `(decision, inputs, outputs)` for every decision type.
    fn queue_counts(&self) -> Vec<(&'static str, usize, usize)> {
        let ledger = self.inner.ledger();
        DecisionType::ALL
            .iter()
            .map(|&d| (d.name(), ledger.num_inputs(d), ledger.num_outputs(d)))
            .collect()
    }

    #[getter]
    fn turns(&self) -> usize {
        self.inner.turns()
    }

    #[getter]
    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Seat whose turn it is.
    #[getter]
    fn current_player(&self) -> usize {
        self.inner.game().turn.index()
    }

    #[getter]
    fn coins(&self) -> Vec<i32> {
        self.inner.game().player_coins.values().copied().collect()
    }

    #[getter]
    fn hand_sizes(&self) -> Vec<usize> {
        self.inner.game().hands.values().map(|hand| hand.len()).collect()
    }

    /// The 6x5 belief matrix, indexed by seat.
    #[getter]
    fn beliefs(&self) -> Vec<Vec<f32>> {
        self.inner.beliefs().rows().iter().map(|row| row.to_vec()).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "GameTrainingWrapper(players={}, turns={}, finished={})",
            self.inner.game().num_players,
            self.inner.turns(),
            self.inner.is_finished()
        )
    }
}
