//! Character cards.
//!
//! Coup has five characters with three copies of each in the court deck.
//! The numeric index of a card is part of the feature contract: one-hot
//! hand encodings, in-play counts and belief rows all use this order.

use serde::{Deserialize, Serialize};

/// Number of distinct character cards.
pub const CARD_TYPES: usize = 5;

/// Copies of each character in a fresh court deck.
pub const COPIES_PER_CARD: usize = 3;

/// A character card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Card {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

impl Card {
    /// All characters in index order.
    pub const ALL: [Card; CARD_TYPES] = [
        Card::Duke,
        Card::Assassin,
        Card::Captain,
        Card::Ambassador,
        Card::Contessa,
    ];

    /// Feature index of this card.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Card with the given feature index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Card::Duke => "Duke",
            Card::Assassin => "Assassin",
            Card::Captain => "Captain",
            Card::Ambassador => "Ambassador",
            Card::Contessa => "Contessa",
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode a set of cards as a `[CARD_TYPES]` indicator vector.
///
/// Duplicates set the same slot, so values stay in `[0, 1]`.
#[must_use]
pub fn one_hot_cards(cards: &[Card]) -> [f32; CARD_TYPES] {
    let mut encoded = [0.0; CARD_TYPES];
    for card in cards {
        encoded[card.index()] = 1.0;
    }
    encoded
}
