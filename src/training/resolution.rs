//! Contest state machine and per-action resolution.
//!
//! Contestable actions walk an explicit phase graph:
//!
//! ```text
//! Proposed ──► Blocked ──► CounterChallenged ──► Resolved
//!    │            └──────────────────────────────►  ▲
//!    ├──► Challenged ────────────────────────────►  │
//!    └──────────────────────────────────────────────┘
//! ```
//!
//! and end in exactly one [`Resolution`]. Income and Coup cannot be
//! contested and produce no contest at all.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use super::decide::BlockContext;
use super::wrapper::GameTrainingWrapper;
use crate::belief::BeliefEvent;
use crate::core::{
    Action, ActiveAction, Block, Card, PlayerId, ASSASSINATE_COST, COUP_COST,
};
use crate::error::TrainingError;

/// Coins gained from income.
pub const INCOME: i32 = 1;

/// Coins gained from foreign aid.
pub const FOREIGN_AID: i32 = 2;

/// Coins gained from tax.
pub const TAX: i32 = 3;

/// Most coins a steal can take.
pub const STEAL_LIMIT: i32 = 2;

/// Where a contested action stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContestPhase {
    /// Announced, nobody has responded yet.
    Proposed,
    /// A block was claimed.
    Blocked,
    /// The actor's claim was challenged.
    Challenged,
    /// The actor challenged the block.
    CounterChallenged,
    Resolved,
}

impl ContestPhase {
    /// Is `next` a legal successor of this phase?
    #[must_use]
    pub const fn can_advance_to(self, next: ContestPhase) -> bool {
        matches!(
            (self, next),
            (
                ContestPhase::Proposed,
                ContestPhase::Blocked | ContestPhase::Challenged | ContestPhase::Resolved
            ) | (
                ContestPhase::Blocked,
                ContestPhase::CounterChallenged | ContestPhase::Resolved
            ) | (ContestPhase::Challenged, ContestPhase::Resolved)
                | (ContestPhase::CounterChallenged, ContestPhase::Resolved)
        )
    }
}

/// How a contest ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Nobody blocked or challenged; the action took effect.
    Unopposed,
    /// The block was not challenged; the action was stopped.
    BlockStands,
    /// The block was challenged and the blocker held the card.
    BlockUpheld,
    /// The block was challenged and was a bluff.
    BlockExposed,
    /// The claim was challenged and the actor held the card.
    ClaimUpheld,
    /// The claim was challenged and was a bluff.
    ClaimExposed,
}

impl Resolution {
    /// The only phase this resolution can be reached from.
    #[must_use]
    pub const fn origin(self) -> ContestPhase {
        match self {
            Resolution::Unopposed => ContestPhase::Proposed,
            Resolution::BlockStands => ContestPhase::Blocked,
            Resolution::BlockUpheld | Resolution::BlockExposed => ContestPhase::CounterChallenged,
            Resolution::ClaimUpheld | Resolution::ClaimExposed => ContestPhase::Challenged,
        }
    }
}

/// The path one contested action took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contest {
    path: SmallVec<[ContestPhase; 4]>,
    resolution: Option<Resolution>,
}

impl Default for Contest {
    fn default() -> Self {
        Self::new()
    }
}

impl Contest {
    /// A freshly proposed action.
    pub fn new() -> Self {
        Self {
            path: smallvec![ContestPhase::Proposed],
            resolution: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ContestPhase {
        self.path.last().copied().unwrap_or(ContestPhase::Proposed)
    }

    /// Every phase visited, in order.
    #[must_use]
    pub fn path(&self) -> &[ContestPhase] {
        &self.path
    }

    /// Final outcome, once resolved.
    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Move to `next`.
    ///
    /// # Panics
    /// Panics on a transition the phase graph does not allow, including
    /// moving to `Resolved` without a resolution.
    pub fn advance(&mut self, next: ContestPhase) {
        assert!(
            next != ContestPhase::Resolved && self.phase().can_advance_to(next),
            "illegal contest transition {:?} -> {next:?}",
            self.phase()
        );
        self.path.push(next);
    }

    /// End the contest with `resolution`.
    ///
    /// # Panics
    /// Panics if `resolution` cannot be reached from the current phase.
    pub fn resolve(&mut self, resolution: Resolution) -> Resolution {
        assert_eq!(
            self.phase(),
            resolution.origin(),
            "{resolution:?} cannot end a contest in {:?}",
            self.phase()
        );
        self.path.push(ContestPhase::Resolved);
        self.resolution = Some(resolution);
        resolution
    }
}

impl GameTrainingWrapper {
    /// Carry out `action` by `actor` against `target`, running every nested
    /// block and challenge decision.
    ///
    /// `opponents` are the living players other than the actor.
    pub(super) fn resolve(
        &mut self,
        actor: PlayerId,
        action: ActiveAction,
        target: PlayerId,
        opponents: &[PlayerId],
    ) -> Result<Option<Contest>, TrainingError> {
        let contest = match action {
            ActiveAction::Income => {
                self.game.player_coins[actor] += INCOME;
                return Ok(None);
            }
            ActiveAction::Coup => {
                self.resolve_coup(actor, target)?;
                return Ok(None);
            }
            ActiveAction::ForeignAid => self.resolve_foreign_aid(actor, opponents)?,
            ActiveAction::Tax => self.resolve_tax(actor, opponents)?,
            ActiveAction::Exchange => self.resolve_exchange(actor, opponents)?,
            ActiveAction::Assassinate => self.resolve_assassinate(actor, target)?,
            ActiveAction::Steal => self.resolve_steal(actor, target)?,
        };
        trace!(actor = %actor, %action, path = ?contest.path(), "contest resolved");
        Ok(Some(contest))
    }

    fn event(&self, player: PlayerId, action: impl Into<Action>) -> BeliefEvent {
        BeliefEvent::observed(player, action, self.game.one_hot_hand(player))
    }

    fn loss_event(&self, player: PlayerId, loss: Option<Card>) -> Option<BeliefEvent> {
        loss.map(|card| self.event(player, Action::Lose(card)))
    }

    /// Does `actor` hold the character `action` claims?
    fn holds_claim(&self, actor: PlayerId, action: ActiveAction) -> bool {
        action
            .claimed_card()
            .is_some_and(|card| self.game.has_card(actor, card))
    }

    /// Shuffle the proven claim card back for a fresh one.
    fn reshuffle_claim(&mut self, actor: PlayerId, action: ActiveAction) -> Option<BeliefEvent> {
        let card = action.claimed_card()?;
        self.game.replace(actor, card);
        Some(self.event(actor, Action::Reshuffle(card)))
    }

    fn steal(&mut self, actor: PlayerId, target: PlayerId) {
        let stolen = self.game.player_coins[target].clamp(0, STEAL_LIMIT);
        self.game.player_coins[target] -= stolen;
        self.game.player_coins[actor] += stolen;
    }

    fn resolve_coup(&mut self, actor: PlayerId, target: PlayerId) -> Result<(), TrainingError> {
        self.game.player_coins[actor] -= COUP_COST;
        let loss = self.lose_card(target);
        let events = self.loss_event(target, loss).into_iter().collect();
        self.observe(events)?;
        Ok(())
    }

    fn resolve_foreign_aid(
        &mut self,
        actor: PlayerId,
        opponents: &[PlayerId],
    ) -> Result<Contest, TrainingError> {
        let mut contest = Contest::new();
        let blocked = self.decide_communal_block(opponents, actor, BlockContext::ForeignAid)?;
        let Some((blocker, block)) = blocked else {
            self.game.player_coins[actor] += FOREIGN_AID;
            contest.resolve(Resolution::Unopposed);
            return Ok(contest);
        };

        contest.advance(ContestPhase::Blocked);
        if !self.decide_challenge(actor, blocker, block.into())?.challenge {
            contest.resolve(Resolution::BlockStands);
            return Ok(contest);
        }

        contest.advance(ContestPhase::CounterChallenged);
        let card = block.claimed_card();
        if self.game.has_card(blocker, card) {
            let loss = self.lose_card(actor);
            self.game.replace(blocker, card);
            let mut events: Vec<_> = self.loss_event(actor, loss).into_iter().collect();
            events.push(self.event(blocker, Action::Reshuffle(card)));
            self.observe(events)?;
            contest.resolve(Resolution::BlockUpheld);
        } else {
            let loss = self.lose_card(blocker);
            self.game.player_coins[actor] += FOREIGN_AID;
            let events = self.loss_event(blocker, loss).into_iter().collect();
            self.observe(events)?;
            contest.resolve(Resolution::BlockExposed);
        }
        Ok(contest)
    }

    fn resolve_tax(
        &mut self,
        actor: PlayerId,
        opponents: &[PlayerId],
    ) -> Result<Contest, TrainingError> {
        let mut contest = Contest::new();
        let claim = ActiveAction::Tax;
        let challenged = self.decide_communal_challenge(opponents, actor, claim.into())?;
        let Some(challenger) = challenged else {
            self.game.player_coins[actor] += TAX;
            contest.resolve(Resolution::Unopposed);
            return Ok(contest);
        };

        contest.advance(ContestPhase::Challenged);
        if self.holds_claim(actor, claim) {
            let loss = self.lose_card(challenger);
            let mut events: Vec<_> = self.reshuffle_claim(actor, claim).into_iter().collect();
            self.game.player_coins[actor] += TAX;
            events.extend(self.loss_event(challenger, loss));
            self.observe(events)?;
            contest.resolve(Resolution::ClaimUpheld);
        } else {
            let loss = self.lose_card(actor);
            let events = self.loss_event(actor, loss).into_iter().collect();
            self.observe(events)?;
            contest.resolve(Resolution::ClaimExposed);
        }
        Ok(contest)
    }

    fn resolve_exchange(
        &mut self,
        actor: PlayerId,
        opponents: &[PlayerId],
    ) -> Result<Contest, TrainingError> {
        let mut contest = Contest::new();
        let claim = ActiveAction::Exchange;
        let challenged = self.decide_communal_challenge(opponents, actor, claim.into())?;
        let Some(challenger) = challenged else {
            self.game.exchange(actor);
            let events = vec![self.event(actor, claim)];
            self.observe(events)?;
            contest.resolve(Resolution::Unopposed);
            return Ok(contest);
        };

        contest.advance(ContestPhase::Challenged);
        if self.holds_claim(actor, claim) {
            let loss = self.lose_card(challenger);
            let mut events: Vec<_> = self.reshuffle_claim(actor, claim).into_iter().collect();
            self.game.exchange(actor);
            events.push(self.event(actor, claim));
            events.extend(self.loss_event(challenger, loss));
            self.observe(events)?;
            contest.resolve(Resolution::ClaimUpheld);
        } else {
            let loss = self.lose_card(actor);
            let events = self.loss_event(actor, loss).into_iter().collect();
            self.observe(events)?;
            contest.resolve(Resolution::ClaimExposed);
        }
        Ok(contest)
    }

    fn resolve_assassinate(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Contest, TrainingError> {
        let mut contest = Contest::new();
        let claim = ActiveAction::Assassinate;
        let block = self.decide_block(target, actor, BlockContext::Assassinate)?;
        let challenge = self.decide_challenge(target, actor, claim.into())?;

        match block.block {
            None if !challenge.challenge => {
                let declined = self.event(target, Block::Assassinate).declined();
                self.game.player_coins[actor] -= ASSASSINATE_COST;
                let loss = self.lose_card(target);
                let mut events = vec![declined];
                events.extend(self.loss_event(target, loss));
                self.observe(events)?;
                contest.resolve(Resolution::Unopposed);
            }
            Some(claimed) if !challenge.challenge || block.value > challenge.value => {
                contest.advance(ContestPhase::Blocked);
                self.game.player_coins[actor] -= ASSASSINATE_COST;
                if !self.decide_challenge(actor, target, claimed.into())?.challenge {
                    contest.resolve(Resolution::BlockStands);
                    return Ok(contest);
                }

                contest.advance(ContestPhase::CounterChallenged);
                let card = claimed.claimed_card();
                if self.game.has_card(target, card) {
                    let loss = self.lose_card(actor);
                    self.game.replace(target, card);
                    let mut events: Vec<_> = self.loss_event(actor, loss).into_iter().collect();
                    events.push(self.event(target, Action::Reshuffle(card)));
                    self.observe(events)?;
                    contest.resolve(Resolution::BlockUpheld);
                } else {
                    // Caught bluffing, then assassinated.
                    let first = self.lose_card(target);
                    let second = self.lose_card(target);
                    let events = self.loss_event(target, second.or(first)).into_iter().collect();
                    self.observe(events)?;
                    contest.resolve(Resolution::BlockExposed);
                }
            }
            _ => {
                contest.advance(ContestPhase::Challenged);
                if self.holds_claim(actor, claim) {
                    let first = self.lose_card(target);
                    self.game.player_coins[actor] -= ASSASSINATE_COST;
                    let second = self.lose_card(target);
                    let mut events: Vec<_> =
                        self.reshuffle_claim(actor, claim).into_iter().collect();
                    events.extend(self.loss_event(target, second.or(first)));
                    self.observe(events)?;
                    contest.resolve(Resolution::ClaimUpheld);
                } else {
                    let loss = self.lose_card(actor);
                    let events = self.loss_event(actor, loss).into_iter().collect();
                    self.observe(events)?;
                    contest.resolve(Resolution::ClaimExposed);
                }
            }
        }
        Ok(contest)
    }

    fn resolve_steal(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Contest, TrainingError> {
        let mut contest = Contest::new();
        let claim = ActiveAction::Steal;
        let block = self.decide_block(target, actor, BlockContext::Steal)?;
        let challenge = self.decide_challenge(target, actor, claim.into())?;

        match block.block {
            None if !challenge.challenge => {
                self.steal(actor, target);
                let events = vec![
                    self.event(target, Block::StealCaptain).declined(),
                    self.event(target, Block::StealAmbassador).declined(),
                ];
                self.observe(events)?;
                contest.resolve(Resolution::Unopposed);
            }
            Some(claimed) if !challenge.challenge || block.value > challenge.value => {
                contest.advance(ContestPhase::Blocked);
                if !self.decide_challenge(actor, target, claimed.into())?.challenge {
                    contest.resolve(Resolution::BlockStands);
                    return Ok(contest);
                }

                contest.advance(ContestPhase::CounterChallenged);
                let card = claimed.claimed_card();
                if self.game.has_card(target, card) {
                    let loss = self.lose_card(actor);
                    self.game.replace(target, card);
                    let mut events: Vec<_> = self.loss_event(actor, loss).into_iter().collect();
                    events.push(self.event(target, Action::Reshuffle(card)));
                    self.observe(events)?;
                    contest.resolve(Resolution::BlockUpheld);
                } else {
                    let loss = self.lose_card(target);
                    self.steal(actor, target);
                    let events = self.loss_event(target, loss).into_iter().collect();
                    self.observe(events)?;
                    contest.resolve(Resolution::BlockExposed);
                }
            }
            _ => {
                contest.advance(ContestPhase::Challenged);
                if self.holds_claim(actor, claim) {
                    let loss = self.lose_card(target);
                    self.steal(actor, target);
                    let mut events: Vec<_> =
                        self.reshuffle_claim(actor, claim).into_iter().collect();
                    events.extend(self.loss_event(target, loss));
                    self.observe(events)?;
                    contest.resolve(Resolution::ClaimUpheld);
                } else {
                    let loss = self.lose_card(actor);
                    let events = self.loss_event(actor, loss).into_iter().collect();
                    self.observe(events)?;
                    contest.resolve(Resolution::ClaimExposed);
                }
            }
        }
        Ok(contest)
    }
}
