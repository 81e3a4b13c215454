//! Merging completed queue data into training batches.

use crate::nn::FeatureBatch;

use super::queue::DecisionQueue;

/// Inputs and labels ready for `Evaluator::fit`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingBatch {
    pub x: FeatureBatch,
    pub y: Vec<f32>,
    /// Samples taken from each source queue, in the order they were read.
    pub counts: Vec<usize>,
}

impl TrainingBatch {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Check if the batch has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Drain the completed data of every queue into one batch.
///
/// Queues without labels are skipped. Samples keep queue order, then
/// arrival order. Returns `None` if no queue had anything ready.
pub fn combine_ready_from_list<'a>(
    queues: impl IntoIterator<Item = &'a mut DecisionQueue>,
) -> Option<TrainingBatch> {
    let mut batch = TrainingBatch::default();
    for queue in queues {
        let Some(data) = queue.read_complete_data() else {
            batch.counts.push(0);
            continue;
        };
        for input in &data.inputs {
            batch.x.push(input);
        }
        batch.counts.push(data.labels.len());
        batch.y.extend(data.labels);
    }
    (!batch.is_empty()).then_some(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::{EncodedState, FeatureTuple};

    fn tuple(a: f32, b: f32) -> FeatureTuple {
        vec![EncodedState::vector(vec![a]), EncodedState::vector(vec![b, b])]
    }

    #[test]
    fn test_combine_nothing_ready() {
        let mut a = DecisionQueue::new();
        a.append_inputs(tuple(1.0, 1.0));
        let mut b = DecisionQueue::new();
        assert!(combine_ready_from_list([&mut a, &mut b]).is_none());
        assert_eq!(a.num_inputs(), 1);
    }

    #[test]
    fn test_combine_preserves_slot_alignment() {
        let mut a = DecisionQueue::new();
        a.append_inputs(tuple(1.0, 10.0));
        a.append_inputs(tuple(2.0, 20.0));
        a.append_output(0.5);

        let mut empty = DecisionQueue::new();

        let mut b = DecisionQueue::new();
        b.append_inputs(tuple(3.0, 30.0));
        b.append_output(1.0);

        let batch = combine_ready_from_list([&mut a, &mut empty, &mut b]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.y, vec![0.5, 1.0]);
        assert_eq!(batch.counts, vec![1, 0, 1]);
        assert_eq!(batch.x.slots()[0].data, vec![1.0, 3.0]);
        assert_eq!(batch.x.slots()[1].data, vec![10.0, 10.0, 30.0, 30.0]);

        assert_eq!(a.num_inputs(), 1);
        assert_eq!(b.num_inputs(), 0);
    }
}
