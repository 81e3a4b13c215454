//! Action codes.
//!
//! Every observable event in a Coup turn has a code in `[0, NUM_ACTIONS)`:
//! the seven active actions a player can take on their turn, the four block
//! claims, losing a card, and reshuffling a revealed card after surviving a
//! challenge. The hand predictor consumes these codes one-hot encoded, so
//! their order is part of the feature contract.

use serde::{Deserialize, Serialize};

use super::card::{Card, CARD_TYPES};

/// Number of active (turn) actions.
pub const NUM_ACTIVE_ACTIONS: usize = 7;

/// Number of block claims.
const NUM_BLOCKS: usize = 4;

/// Total number of action codes.
pub const NUM_ACTIONS: usize = NUM_ACTIVE_ACTIONS + NUM_BLOCKS + 2 * CARD_TYPES;

/// Number of actions that can be challenged.
pub const NUM_CHALLENGEABLE_ACTIONS: usize = 8;

/// Coins needed to coup.
pub const COUP_COST: i32 = 7;

/// Coins needed to assassinate.
pub const ASSASSINATE_COST: i32 = 3;

/// At or above this many coins a player must coup.
pub const FORCED_COUP_COINS: i32 = 10;

/// An action taken on a player's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveAction {
    Income,
    ForeignAid,
    Coup,
    Tax,
    Assassinate,
    Exchange,
    Steal,
}

impl ActiveAction {
    /// All active actions in code order.
    pub const ALL: [ActiveAction; NUM_ACTIVE_ACTIONS] = [
        ActiveAction::Income,
        ActiveAction::ForeignAid,
        ActiveAction::Coup,
        ActiveAction::Tax,
        ActiveAction::Assassinate,
        ActiveAction::Exchange,
        ActiveAction::Steal,
    ];

    /// Index among the active actions.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Does this action name a target player?
    #[must_use]
    pub const fn is_targeting(self) -> bool {
        matches!(
            self,
            ActiveAction::Coup | ActiveAction::Assassinate | ActiveAction::Steal
        )
    }

    /// Character a player claims by taking this action, if any.
    #[must_use]
    pub const fn claimed_card(self) -> Option<Card> {
        match self {
            ActiveAction::Tax => Some(Card::Duke),
            ActiveAction::Assassinate => Some(Card::Assassin),
            ActiveAction::Exchange => Some(Card::Ambassador),
            ActiveAction::Steal => Some(Card::Captain),
            ActiveAction::Income | ActiveAction::ForeignAid | ActiveAction::Coup => None,
        }
    }

    /// Is this action legal for a player holding `coins`?
    ///
    /// Coup costs 7, assassination costs 3, and at 10 or more coins the
    /// player must coup.
    #[must_use]
    pub const fn is_legal_with(self, coins: i32) -> bool {
        match self {
            ActiveAction::Coup => coins >= COUP_COST,
            _ if coins >= FORCED_COUP_COINS => false,
            ActiveAction::Assassinate => coins >= ASSASSINATE_COST,
            _ => true,
        }
    }

    /// Active actions legal for a player holding `coins`, in code order.
    pub fn legal_for(coins: i32) -> impl Iterator<Item = ActiveAction> {
        Self::ALL.into_iter().filter(move |a| a.is_legal_with(coins))
    }
}

impl std::fmt::Display for ActiveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActiveAction::Income => "Income",
            ActiveAction::ForeignAid => "Foreign Aid",
            ActiveAction::Coup => "Coup",
            ActiveAction::Tax => "Tax",
            ActiveAction::Assassinate => "Assassinate",
            ActiveAction::Exchange => "Exchange",
            ActiveAction::Steal => "Steal",
        };
        f.write_str(name)
    }
}

/// A block claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    ForeignAid,
    Assassinate,
    StealCaptain,
    StealAmbassador,
}

impl Block {
    /// Character the blocker claims.
    #[must_use]
    pub const fn claimed_card(self) -> Card {
        match self {
            Block::ForeignAid => Card::Duke,
            Block::Assassinate => Card::Contessa,
            Block::StealCaptain => Card::Captain,
            Block::StealAmbassador => Card::Ambassador,
        }
    }
}

/// Any observable event code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Active(ActiveAction),
    Block(Block),
    /// A player lost (revealed and discarded) this card.
    Lose(Card),
    /// A player proved this card and shuffled it back for a fresh one.
    Reshuffle(Card),
}

impl Action {
    /// Code in `[0, NUM_ACTIONS)`.
    #[must_use]
    pub const fn code(self) -> usize {
        match self {
            Action::Active(a) => a.index(),
            Action::Block(b) => NUM_ACTIVE_ACTIONS + b as usize,
            Action::Lose(c) => NUM_ACTIVE_ACTIONS + NUM_BLOCKS + c.index(),
            Action::Reshuffle(c) => NUM_ACTIVE_ACTIONS + NUM_BLOCKS + CARD_TYPES + c.index(),
        }
    }

    /// Position among the challengeable actions, if this action can be challenged.
    #[must_use]
    pub const fn challengeable_index(self) -> Option<usize> {
        match self {
            Action::Active(ActiveAction::Tax) => Some(0),
            Action::Active(ActiveAction::Assassinate) => Some(1),
            Action::Active(ActiveAction::Exchange) => Some(2),
            Action::Active(ActiveAction::Steal) => Some(3),
            Action::Block(Block::ForeignAid) => Some(4),
            Action::Block(Block::Assassinate) => Some(5),
            Action::Block(Block::StealCaptain) => Some(6),
            Action::Block(Block::StealAmbassador) => Some(7),
            _ => None,
        }
    }
}

impl From<ActiveAction> for Action {
    fn from(action: ActiveAction) -> Self {
        Action::Active(action)
    }
}

impl From<Block> for Action {
    fn from(block: Block) -> Self {
        Action::Block(block)
    }
}
