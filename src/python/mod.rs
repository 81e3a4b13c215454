//! Python bindings for Coup self-play training.
//!
//! Any Python object with Keras-style `predict` and `fit` methods can act as
//! one of the six evaluators.
//!
//! # Quick Start
//!
//! ```python
//! import coup_selfplay as cs
//!
//! # One model per decision type, e.g. compiled Keras models
//! wrapper = cs.GameTrainingWrapper(
//!     3, action, assassinate_block, foreign_aid_block, steal_block, challenge, hand,
//!     epsilon=0.1, seed=7,
//! )
//!
//! while wrapper.take_turn():
//!     if wrapper.turns % 50 == 0:
//!         wrapper.train_all_evaluators()
//! wrapper.train_all_evaluators()
//! ```

use pyo3::prelude::*;

mod py_evaluator;
mod py_self_play;
mod py_training;

pub use py_evaluator::PyEvaluator;
pub use py_self_play::*;
pub use py_training::*;

/// coup_selfplay: Coup self-play with deferred-reward training queues.
#[pymodule]
fn coup_selfplay(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGameTrainingWrapper>()?;
    m.add_class::<PyTurnReport>()?;

    m.add_class::<PySelfPlayConfig>()?;
    m.add_class::<PyGameSummary>()?;
    m.add_class::<PySelfPlayWorker>()?;

    Ok(())
}
