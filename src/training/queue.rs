//! Deferred-label queue for one (player, decision type) pair.
//!
//! A decision's inputs are known when it is made; its label only when the
//! player's next turn is evaluated, the player is eliminated, or the game
//! ends. Labels match inputs strictly in arrival order.

use std::collections::VecDeque;

use crate::nn::FeatureTuple;

/// Inputs awaiting labels, and labels awaiting collection.
///
/// Invariant: `num_outputs() <= num_inputs()`.
#[derive(Clone, Debug, Default)]
pub struct DecisionQueue {
    inputs: VecDeque<FeatureTuple>,
    outputs: Vec<f32>,
}

/// Matched (input, label) pairs removed from a queue.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedData {
    pub inputs: Vec<FeatureTuple>,
    pub labels: Vec<f32>,
}

impl DecisionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision's inputs.
    pub fn append_inputs(&mut self, inputs: FeatureTuple) {
        self.inputs.push_back(inputs);
    }

    /// Label the oldest unlabelled input.
    ///
    /// # Panics
    /// Panics if every input already has a label.
    pub fn append_output(&mut self, label: f32) {
        assert!(
            self.outputs.len() < self.inputs.len(),
            "decision queue has {} inputs and cannot take label {}",
            self.inputs.len(),
            self.outputs.len() + 1
        );
        self.outputs.push(label);
    }

    /// Inputs held, labelled or not.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Labels held.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Inputs still waiting for a label.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inputs.len() - self.outputs.len()
    }

    /// Most recent label, if any is held.
    #[must_use]
    pub fn last_output(&self) -> Option<f32> {
        self.outputs.last().copied()
    }

    /// Label every pending input with `label`. Returns how many were labelled.
    pub fn backfill(&mut self, label: f32) -> usize {
        let count = self.pending();
        self.outputs.extend(std::iter::repeat(label).take(count));
        count
    }

    /// Remove and return every labelled input with its label.
    ///
    /// Returns `None` when no label is held. Unlabelled inputs stay queued.
    ///
    /// # Panics
    /// Panics if the queue holds more labels than inputs.
    pub fn read_complete_data(&mut self) -> Option<CompletedData> {
        if self.outputs.is_empty() {
            return None;
        }
        assert!(
            self.inputs.len() >= self.outputs.len(),
            "decision queue desynchronised: {} inputs, {} outputs",
            self.inputs.len(),
            self.outputs.len()
        );

        let labels = std::mem::take(&mut self.outputs);
        let inputs = self.inputs.drain(..labels.len()).collect();
        Some(CompletedData { inputs, labels })
    }

    /// Put back data taken by `read_complete_data`, ahead of everything
    /// still queued.
    ///
    /// # Panics
    /// Panics if `data` has more labels than inputs.
    pub fn restore(&mut self, data: CompletedData) {
        assert_eq!(
            data.inputs.len(),
            data.labels.len(),
            "restored data must pair every input with a label"
        );
        for input in data.inputs.into_iter().rev() {
            self.inputs.push_front(input);
        }
        let mut outputs = data.labels;
        outputs.append(&mut self.outputs);
        self.outputs = outputs;
    }

    /// Drop everything appended after the queue held `inputs` inputs and
    /// `outputs` labels.
    pub fn truncate(&mut self, inputs: usize, outputs: usize) {
        self.inputs.truncate(inputs);
        self.outputs.truncate(outputs.min(self.inputs.len()));
    }
}
