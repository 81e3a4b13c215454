//! Per-(player, decision type) deferred-reward ledger.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PlayerMap};

use super::batch::{combine_ready_from_list, TrainingBatch};
use super::queue::{CompletedData, DecisionQueue};

/// The six decision kinds, each with its own evaluator and queues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionType {
    Action,
    AssassinateBlock,
    ForeignAidBlock,
    StealBlock,
    Challenge,
    HandPrediction,
}

impl DecisionType {
    pub const COUNT: usize = 6;

    /// All decision types, in ledger order.
    pub const ALL: [DecisionType; Self::COUNT] = [
        DecisionType::Action,
        DecisionType::AssassinateBlock,
        DecisionType::ForeignAidBlock,
        DecisionType::StealBlock,
        DecisionType::Challenge,
        DecisionType::HandPrediction,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DecisionType::Action => "action",
            DecisionType::AssassinateBlock => "assassinate_block",
            DecisionType::ForeignAidBlock => "foreign_aid_block",
            DecisionType::StealBlock => "steal_block",
            DecisionType::Challenge => "challenge",
            DecisionType::HandPrediction => "hand_prediction",
        }
    }

    /// Inverse of `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|decision| decision.name() == name)
    }
}

impl std::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Queue lengths recorded by [`DecisionLedger::checkpoint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerCheckpoint {
    lengths: [Vec<(usize, usize)>; DecisionType::COUNT],
}

/// One `DecisionQueue` per player per decision type.
#[derive(Clone, Debug)]
pub struct DecisionLedger {
    queues: [PlayerMap<DecisionQueue>; DecisionType::COUNT],
}

impl DecisionLedger {
    /// Empty queues for a `player_count` table.
    pub fn new(player_count: usize) -> Self {
        Self {
            queues: std::array::from_fn(|_| PlayerMap::with_default(player_count)),
        }
    }

    /// Number of seats tracked.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.queues[0].player_count()
    }

    #[must_use]
    pub fn queue(&self, decision: DecisionType, player: PlayerId) -> &DecisionQueue {
        &self.queues[decision.index()][player]
    }

    pub fn queue_mut(&mut self, decision: DecisionType, player: PlayerId) -> &mut DecisionQueue {
        &mut self.queues[decision.index()][player]
    }

    /// Every queue of `player`, in decision-type order.
    pub fn player_queues(&self, player: PlayerId) -> impl Iterator<Item = &DecisionQueue> {
        self.queues.iter().map(move |by_player| &by_player[player])
    }

    /// Label every pending input of `player`, across all decision types.
    /// Returns how many labels were written.
    pub fn backfill_player(&mut self, player: PlayerId, label: f32) -> usize {
        self.queues
            .iter_mut()
            .map(|by_player| by_player[player].backfill(label))
            .sum()
    }

    /// Does `player` have no unlabelled inputs?
    #[must_use]
    pub fn is_settled(&self, player: PlayerId) -> bool {
        self.player_queues(player).all(|q| q.pending() == 0)
    }

    /// Drain every player's completed data for `decision` into one batch.
    pub fn take_batch(&mut self, decision: DecisionType) -> Option<TrainingBatch> {
        combine_ready_from_list(self.queues[decision.index()].iter_mut().map(|(_, q)| q))
    }

    /// Return a batch from `take_batch` to the queues it came from, e.g.
    /// after a failed fit.
    ///
    /// # Panics
    /// Panics if the batch was not taken from this ledger's `decision` queues.
    pub fn restore_batch(&mut self, decision: DecisionType, batch: TrainingBatch) {
        let queues = &mut self.queues[decision.index()];
        assert_eq!(batch.counts.len(), queues.player_count(), "batch from another ledger");

        let mut row = 0;
        for ((_, queue), &count) in queues.iter_mut().zip(&batch.counts) {
            if count == 0 {
                continue;
            }
            queue.restore(CompletedData {
                inputs: (row..row + count).map(|r| batch.x.sample(r)).collect(),
                labels: batch.y[row..row + count].to_vec(),
            });
            row += count;
        }
    }

    /// Record every queue's length.
    ///
    /// Queues only grow between training cycles, so [`DecisionLedger::rollback`]
    /// to this checkpoint undoes everything appended since.
    #[must_use]
    pub fn checkpoint(&self) -> LedgerCheckpoint {
        LedgerCheckpoint {
            lengths: std::array::from_fn(|i| {
                self.queues[i]
                    .values()
                    .map(|q| (q.num_inputs(), q.num_outputs()))
                    .collect()
            }),
        }
    }

    /// Drop every input and label appended since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: &LedgerCheckpoint) {
        for (by_player, lengths) in self.queues.iter_mut().zip(&checkpoint.lengths) {
            for ((_, queue), &(inputs, outputs)) in by_player.iter_mut().zip(lengths) {
                queue.truncate(inputs, outputs);
            }
        }
    }

    /// Total inputs held for `decision`, across players.
    #[must_use]
    pub fn num_inputs(&self, decision: DecisionType) -> usize {
        self.queues[decision.index()].values().map(DecisionQueue::num_inputs).sum()
    }

    /// Total labels held for `decision`, across players.
    #[must_use]
    pub fn num_outputs(&self, decision: DecisionType) -> usize {
        self.queues[decision.index()].values().map(DecisionQueue::num_outputs).sum()
    }
}
