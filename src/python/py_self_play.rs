//! Self-play bindings for Python.

use pyo3::prelude::*;

use crate::core::PlayerId;
use crate::training::{DecisionType, GameSummary, SelfPlayConfig, SelfPlayWorker};

use super::py_training::{config_error, evaluator_set, trainer_config, training_error};

/// Python wrapper for SelfPlayConfig.
#[pyclass(name = "SelfPlayConfig")]
#[derive(Clone)]
pub struct PySelfPlayConfig(pub SelfPlayConfig);

#[pymethods]
impl PySelfPlayConfig {
    #[new]
    #[pyo3(signature = (max_turns=500, train_interval=50, seed_offset=0))]
    fn new(max_turns: usize, train_interval: usize, seed_offset: u64) -> Self {
        Self(
            SelfPlayConfig::new()
                .with_max_turns(max_turns)
                .with_train_interval(train_interval)
                .with_seed_offset(seed_offset),
        )
    }

    #[getter]
    fn max_turns(&self) -> usize {
        self.0.max_turns
    }

    #[getter]
    fn train_interval(&self) -> usize {
        self.0.train_interval
    }

    #[getter]
    fn seed_offset(&self) -> u64 {
        self.0.seed_offset
    }

    fn __repr__(&self) -> String {
        format!(
            "SelfPlayConfig(max_turns={}, train_interval={}, seed_offset={})",
            self.0.max_turns, self.0.train_interval, self.0.seed_offset
        )
    }
}

/// Result of one self-play game.
#[pyclass(name = "GameSummary")]
#[derive(Clone)]
pub struct PyGameSummary(pub GameSummary);

#[pymethods]
impl PyGameSummary {
    #[getter]
    fn seed(&self) -> u64 {
        self.0.seed
    }

    #[getter]
    fn turns(&self) -> usize {
        self.0.turns
    }

    #[getter]
    fn winner(&self) -> Option<usize> {
        self.0.winner.map(PlayerId::index)
    }

    #[getter]
    fn completed(&self) -> bool {
        self.0.completed
    }

    /// Samples fit per decision type, as `(name, count)` pairs.
    #[getter]
    fn trained(&self) -> Vec<(&'static str, usize)> {
        DecisionType::ALL
            .iter()
            .map(|&d| (d.name(), self.0.trained[d.index()]))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "GameSummary(seed={}, turns={}, winner={:?}, trained={})",
            self.0.seed,
            self.0.turns,
            self.winner(),
            self.0.total_trained()
        )
    }
}

/// Plays whole games with six Python models, training as it goes.
#[pyclass(name = "SelfPlayWorker", unsendable)]
pub struct PySelfPlayWorker {
    inner: SelfPlayWorker,
}

#[pymethods]
impl PySelfPlayWorker {
    #[new]
    #[pyo3(signature = (
        num_players,
        models,
        config = None,
        epsilon = 0.1,
        seed = 42,
        batch_size = 32,
        epochs = 1,
        verbose = 0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_players: usize,
        models: [PyObject; DecisionType::COUNT],
        config: Option<PySelfPlayConfig>,
        epsilon: f64,
        seed: u64,
        batch_size: usize,
        epochs: usize,
        verbose: u8,
    ) -> PyResult<Self> {
        let trainer = trainer_config(num_players, epsilon, seed, batch_size, epochs, verbose);
        let config = config.map(|c| c.0).unwrap_or_default();
        let inner =
            SelfPlayWorker::new(trainer, config, evaluator_set(models)).map_err(config_error)?;
        Ok(Self { inner })
    }

    /// Play game `index` and return its summary.
    fn play_game(&mut self, index: u64) -> PyResult<PyGameSummary> {
        self.inner
            .play_game(index)
            .map(PyGameSummary)
            .map_err(training_error)
    }

    /// Play `count` games in sequence.
    fn play_games(&mut self, count: usize) -> PyResult<Vec<PyGameSummary>> {
        Ok(self
            .inner
            .play_games(count)
            .map_err(training_error)?
            .into_iter()
            .map(PyGameSummary)
            .collect())
    }

    fn game_seed(&self, index: u64) -> u64 {
        self.inner.game_seed(index)
    }

    #[getter]
    fn config(&self) -> PySelfPlayConfig {
        PySelfPlayConfig(self.inner.config().clone())
    }
}
