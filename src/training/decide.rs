//! Block and challenge decisions.
//!
//! Each decision encodes the decider's view of the table once, scores every
//! option with the matching evaluator (unless the policy explores), and
//! records the chosen option's tuple in the decider's queue. The value
//! returned alongside a choice is the best predicted score, or 0 when the
//! choice was exploratory.

use tracing::trace;

use super::ledger::DecisionType;
use super::policy::ExplorationPolicy;
use super::wrapper::GameTrainingWrapper;
use crate::core::{Action, Block, PlayerId};
use crate::error::EvaluatorError;
use crate::nn::{
    challenge_option, with_option, EncodedState, FeatureBatch, FeatureEncoder, FeatureTuple,
    Viewpoint,
};

/// Which action a block decision responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockContext {
    ForeignAid,
    Assassinate,
    Steal,
}

type BlockOption = (&'static [f32], Option<Block>);

const FOREIGN_AID_OPTIONS: [BlockOption; 2] = [(&[0.0], None), (&[1.0], Some(Block::ForeignAid))];

const ASSASSINATE_OPTIONS: [BlockOption; 2] = [(&[0.0], None), (&[1.0], Some(Block::Assassinate))];

const STEAL_OPTIONS: [BlockOption; 3] = [
    (&[0.0, 0.0], None),
    (&[1.0, 0.0], Some(Block::StealCaptain)),
    (&[0.0, 1.0], Some(Block::StealAmbassador)),
];

impl BlockContext {
    /// Evaluator and queue this decision belongs to.
    #[must_use]
    pub const fn decision_type(self) -> DecisionType {
        match self {
            BlockContext::ForeignAid => DecisionType::ForeignAidBlock,
            BlockContext::Assassinate => DecisionType::AssassinateBlock,
            BlockContext::Steal => DecisionType::StealBlock,
        }
    }

    /// Option slot values and the block each one stands for. Not blocking
    /// comes first.
    #[must_use]
    pub fn options(self) -> &'static [BlockOption] {
        match self {
            BlockContext::ForeignAid => &FOREIGN_AID_OPTIONS,
            BlockContext::Assassinate => &ASSASSINATE_OPTIONS,
            BlockContext::Steal => &STEAL_OPTIONS,
        }
    }
}

/// Outcome of a single block decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockDecision {
    pub block: Option<Block>,
    pub value: f32,
}

/// Outcome of a single challenge decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChallengeDecision {
    pub challenge: bool,
    pub value: f32,
}

impl GameTrainingWrapper {
    /// Choose among `candidates` for `decision`: arg-max of the evaluator's
    /// scores, or a uniform pick with value 0 when exploring.
    fn choose_option(
        &mut self,
        decision: DecisionType,
        candidates: &[FeatureTuple],
    ) -> Result<(usize, f32), EvaluatorError> {
        if self.policy.explore(&mut self.rng) {
            return Ok((self.rng.gen_index(candidates.len()), 0.0));
        }
        let scores = self
            .evaluators
            .get(decision)
            .predict_rows(&FeatureBatch::from_samples(candidates), 1)?;
        let index = ExplorationPolicy::argmax(&scores).unwrap_or(0);
        Ok((index, scores[index]))
    }

    /// `blocker` decides whether (and with which card) to block `blockee`.
    ///
    /// The chosen option is queued for `blocker`.
    pub fn decide_block(
        &mut self,
        blocker: PlayerId,
        blockee: PlayerId,
        context: BlockContext,
    ) -> Result<BlockDecision, EvaluatorError> {
        let noise = self.noise();
        let viewpoint = Viewpoint::Versus {
            decider: blocker,
            opponent: blockee,
        };
        let base = FeatureEncoder::new(&self.game, &self.beliefs).decision_state(viewpoint, &noise);

        let options = context.options();
        let mut candidates: Vec<_> = options
            .iter()
            .map(|&(slot, _)| with_option(&base, [EncodedState::vector(slot)]))
            .collect();

        let decision = context.decision_type();
        let (index, value) = self.choose_option(decision, &candidates)?;
        self.ledger
            .queue_mut(decision, blocker)
            .append_inputs(candidates.swap_remove(index));

        let block = options[index].1;
        trace!(blocker = %blocker, blockee = %blockee, ?block, value, "block decision");
        Ok(BlockDecision { block, value })
    }

    /// `challenger` decides whether to challenge `challengee`'s `claim`.
    ///
    /// The chosen option is queued for `challenger`.
    ///
    /// # Panics
    /// Panics if `claim` is not a challengeable action.
    pub fn decide_challenge(
        &mut self,
        challenger: PlayerId,
        challengee: PlayerId,
        claim: Action,
    ) -> Result<ChallengeDecision, EvaluatorError> {
        let claim_index = claim
            .challengeable_index()
            .unwrap_or_else(|| panic!("{claim:?} cannot be challenged"));

        let noise = self.noise();
        let viewpoint = Viewpoint::Versus {
            decider: challenger,
            opponent: challengee,
        };
        let base = FeatureEncoder::new(&self.game, &self.beliefs).decision_state(viewpoint, &noise);
        let mut candidates: Vec<_> = [false, true]
            .into_iter()
            .map(|challenge| with_option(&base, challenge_option(claim_index, challenge)))
            .collect();

        let (index, value) = self.choose_option(DecisionType::Challenge, &candidates)?;
        self.ledger
            .queue_mut(DecisionType::Challenge, challenger)
            .append_inputs(candidates.swap_remove(index));

        let challenge = index == 1;
        trace!(
            challenger = %challenger,
            challengee = %challengee,
            ?claim,
            challenge,
            value,
            "challenge decision"
        );
        Ok(ChallengeDecision { challenge, value })
    }

    /// Every player in `blockers` decides on blocking `blockee`.
    ///
    /// Among those who chose to block, the highest value wins, ties going to
    /// the earliest in `blockers`. Returns the winner and their block.
    pub fn decide_communal_block(
        &mut self,
        blockers: &[PlayerId],
        blockee: PlayerId,
        context: BlockContext,
    ) -> Result<Option<(PlayerId, Block)>, EvaluatorError> {
        let mut best: Option<(PlayerId, Block, f32)> = None;
        for &blocker in blockers {
            let decision = self.decide_block(blocker, blockee, context)?;
            let Some(block) = decision.block else {
                continue;
            };
            if best.map_or(true, |(_, _, value)| decision.value > value) {
                best = Some((blocker, block, decision.value));
            }
        }
        Ok(best.map(|(blocker, block, _)| (blocker, block)))
    }

    /// One player drawn uniformly from `challengers` decides on challenging
    /// `challengee`'s `claim`. Returns the challenger if they did.
    pub fn decide_communal_challenge(
        &mut self,
        challengers: &[PlayerId],
        challengee: PlayerId,
        claim: Action,
    ) -> Result<Option<PlayerId>, EvaluatorError> {
        if challengers.is_empty() {
            return Ok(None);
        }
        let challenger = challengers[self.rng.gen_index(challengers.len())];
        let decision = self.decide_challenge(challenger, challengee, claim)?;
        Ok(decision.challenge.then_some(challenger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_options_start_with_pass() {
        for context in [BlockContext::ForeignAid, BlockContext::Assassinate, BlockContext::Steal] {
            let options = context.options();
            assert_eq!(options[0].1, None);
            assert!(options[0].0.iter().all(|&v| v == 0.0));
            assert!(options[1..].iter().all(|(_, block)| block.is_some()));
        }
        assert_eq!(BlockContext::Steal.options().len(), 3);
        assert_eq!(BlockContext::Steal.options()[1].1, Some(Block::StealCaptain));
    }

    #[test]
    fn test_decision_types() {
        assert_eq!(BlockContext::Steal.decision_type(), DecisionType::StealBlock);
        assert_eq!(BlockContext::ForeignAid.decision_type(), DecisionType::ForeignAidBlock);
    }
}
