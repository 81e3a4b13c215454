//! Keras-style Python models as evaluators.

use numpy::{PyArray1, PyArrayMethods};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use tracing::warn;

use crate::error::EvaluatorError;
use crate::nn::{Evaluator, FeatureBatch, FitOptions};

/// Any Python object with `predict(x)` and `fit(x=, y=, ...)`.
///
/// `x` is passed as a list of numpy arrays, one per feature slot, each with
/// the batch dimension first. If the object also has `fit_predict(x, y)`, it
/// is used for combined calls.
pub struct PyEvaluator {
    model: PyObject,
    name: String,
    warned_fallback: bool,
}

impl PyEvaluator {
    pub fn new(model: PyObject, name: impl Into<String>) -> Self {
        Self {
            model,
            name: name.into(),
            warned_fallback: false,
        }
    }

    fn backend_error(&self, call: &str, err: PyErr) -> EvaluatorError {
        warn!(evaluator = %self.name, call, error = %err, "python evaluator raised");
        EvaluatorError::Backend(format!("{}.{call}: {err}", self.name))
    }
}

fn inputs<'py>(py: Python<'py>, x: &FeatureBatch) -> PyResult<Bound<'py, PyList>> {
    let arrays = x
        .slots()
        .iter()
        .map(|slot| {
            PyArray1::from_slice_bound(py, &slot.data)
                .reshape(slot.batch_shape(x.len()))
                .map(Bound::into_any)
        })
        .collect::<PyResult<Vec<_>>>()?;
    Ok(PyList::new_bound(py, arrays))
}

fn labels<'py>(py: Python<'py>, y: &[f32], rows: usize) -> PyResult<Bound<'py, PyAny>> {
    let width = if rows == 0 { 0 } else { y.len() / rows };
    Ok(PyArray1::from_slice_bound(py, y).reshape([rows, width])?.into_any())
}

/// Flatten whatever the model returned into row-major `f32`s.
fn flatten(py: Python<'_>, output: &Bound<'_, PyAny>) -> PyResult<Vec<f32>> {
    py.import_bound("numpy")?
        .call_method1("ravel", (output,))?
        .call_method0("tolist")?
        .extract()
}

impl Evaluator for PyEvaluator {
    fn predict(&self, x: &FeatureBatch) -> Result<Vec<f32>, EvaluatorError> {
        Python::with_gil(|py| {
            let x = inputs(py, x)?;
            let output = self.model.bind(py).call_method1("predict", (x,))?;
            flatten(py, &output)
        })
        .map_err(|err| self.backend_error("predict", err))
    }

    fn fit(
        &mut self,
        x: &FeatureBatch,
        y: &[f32],
        options: &FitOptions,
    ) -> Result<(), EvaluatorError> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("x", inputs(py, x)?)?;
            kwargs.set_item("y", labels(py, y, x.len())?)?;
            kwargs.set_item("batch_size", options.batch_size)?;
            kwargs.set_item("epochs", options.epochs)?;
            kwargs.set_item("verbose", options.verbose)?;
            self.model.bind(py).call_method("fit", (), Some(&kwargs))?;
            Ok(())
        })
        .map_err(|err| self.backend_error("fit", err))
    }

    fn fit_predict(
        &mut self,
        x: &FeatureBatch,
        y: &[f32],
        options: &FitOptions,
    ) -> Result<Vec<f32>, EvaluatorError> {
        let has_fit_predict = Python::with_gil(|py| {
            self.model
                .bind(py)
                .hasattr("fit_predict")
                .unwrap_or(false)
        });
        if !has_fit_predict {
            if !self.warned_fallback {
                warn!(evaluator = %self.name, "no fit_predict, falling back to predict then fit");
                self.warned_fallback = true;
            }
            let scores = self.predict(x)?;
            self.fit(x, y, options)?;
            return Ok(scores);
        }

        Python::with_gil(|py| {
            let output = self
                .model
                .bind(py)
                .call_method1("fit_predict", (inputs(py, x)?, labels(py, y, x.len())?))?;
            flatten(py, &output)
        })
        .map_err(|err| self.backend_error("fit_predict", err))
    }
}
