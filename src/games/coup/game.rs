//! Coup game bookkeeping: court deck, hands, discards, coins and turn order.
//!
//! `CoupGame` knows the physical state of the table and nothing about
//! decisions, beliefs or rewards. The training wrapper drives it.

use smallvec::SmallVec;

use crate::core::{
    one_hot_cards, Card, GameRng, PlayerId, PlayerMap, CARD_TYPES, COPIES_PER_CARD, MAX_PLAYERS,
    MIN_PLAYERS,
};

/// Coins each player starts with.
pub const STARTING_COINS: i32 = 2;

/// Cards dealt to each player.
pub const STARTING_HAND: usize = 2;

/// Cards drawn from the deck by an exchange.
pub const EXCHANGE_DRAW: usize = 2;

/// A player's hidden cards. Holds up to four cards while exchanging.
pub type Hand = SmallVec<[Card; 4]>;

/// Table state of one Coup game.
#[derive(Clone, Debug)]
pub struct CoupGame {
    /// Number of seated players.
    pub num_players: usize,

    /// Hidden cards per player, in the order they were received.
    /// An empty hand means the player is out.
    pub hands: PlayerMap<Hand>,

    /// Coins per player.
    pub player_coins: PlayerMap<i32>,

    /// Undealt court deck; cards are drawn from the end.
    pub deck: Vec<Card>,

    /// Revealed (lost) cards.
    pub discards: Vec<Card>,

    /// Seat whose turn it is.
    pub turn: PlayerId,

    rng: GameRng,
}

impl CoupGame {
    /// Shuffle a fresh court deck and deal a new game.
    ///
    /// # Panics
    /// Panics if `num_players` is outside 2..=6.
    pub fn new(num_players: usize, rng: GameRng) -> Self {
        assert!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players),
            "Player count must be 2-6"
        );

        let deck = Card::ALL
            .iter()
            .flat_map(|&card| std::iter::repeat(card).take(COPIES_PER_CARD))
            .collect();

        let mut game = Self {
            num_players,
            hands: PlayerMap::with_default(num_players),
            player_coins: PlayerMap::with_value(num_players, STARTING_COINS),
            deck,
            discards: Vec::new(),
            turn: PlayerId::new(0),
            rng,
        };
        game.shuffle();

        for _ in 0..STARTING_HAND {
            for player in PlayerId::all(num_players) {
                if let Some(card) = game.draw_from_deck() {
                    game.hands[player].push(card);
                }
            }
        }

        game
    }

    /// Shuffle the deck.
    pub fn shuffle(&mut self) {
        self.rng.shuffle(&mut self.deck);
    }

    /// Draw the top card of the deck.
    pub fn draw_from_deck(&mut self) -> Option<Card> {
        self.deck.pop()
    }

    /// Count of each card not yet discarded (hands plus deck).
    #[must_use]
    pub fn count_inplay(&self) -> [f32; CARD_TYPES] {
        let mut counts = [COPIES_PER_CARD as f32; CARD_TYPES];
        for card in &self.discards {
            counts[card.index()] -= 1.0;
        }
        counts
    }

    /// Hand sizes as a `[MAX_PLAYERS]` row.
    #[must_use]
    pub fn hand_sizes(&self) -> [f32; MAX_PLAYERS] {
        self.hands.padded_row(|hand| hand.len() as f32)
    }

    /// Coins as a `[MAX_PLAYERS]` row.
    #[must_use]
    pub fn coins_row(&self) -> [f32; MAX_PLAYERS] {
        self.player_coins.padded_row(|&coins| coins as f32)
    }

    /// Indicator vector of the cards `player` holds.
    #[must_use]
    pub fn one_hot_hand(&self, player: PlayerId) -> [f32; CARD_TYPES] {
        one_hot_cards(&self.hands[player])
    }

    /// Does `player` hold `card`?
    #[must_use]
    pub fn has_card(&self, player: PlayerId, card: Card) -> bool {
        self.hands[player].contains(&card)
    }

    /// Is `player` still in the game?
    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        !self.hands[player].is_empty()
    }

    /// Living players in seat order.
    #[must_use]
    pub fn players_in(&self) -> Vec<PlayerId> {
        PlayerId::all(self.num_players)
            .filter(|&p| self.is_alive(p))
            .collect()
    }

    /// Return a proven `card` to the deck, shuffle, and draw a replacement.
    ///
    /// Does nothing if `player` does not hold `card`.
    pub fn replace(&mut self, player: PlayerId, card: Card) {
        let Some(position) = self.hands[player].iter().position(|&c| c == card) else {
            return;
        };
        self.hands[player].remove(position);
        self.deck.push(card);
        self.shuffle();
        if let Some(fresh) = self.draw_from_deck() {
            self.hands[player].push(fresh);
        }
    }

    /// Reveal and discard `player`'s first card.
    pub fn discard_first(&mut self, player: PlayerId) -> Option<Card> {
        if self.hands[player].is_empty() {
            return None;
        }
        let card = self.hands[player].remove(0);
        self.discards.push(card);
        Some(card)
    }

    /// Ambassador exchange: draw two, keep as many cards as before at random,
    /// return the rest and shuffle.
    pub fn exchange(&mut self, player: PlayerId) {
        let keep = self.hands[player].len();
        for _ in 0..EXCHANGE_DRAW {
            if let Some(card) = self.draw_from_deck() {
                self.hands[player].push(card);
            }
        }
        self.rng.shuffle(&mut self.hands[player]);
        let returned: Vec<Card> = self.hands[player].drain(keep..).collect();
        self.deck.extend(returned);
        self.shuffle();
    }

    /// Advance the turn to the next living player.
    pub fn next_turn(&mut self) {
        for step in 1..=self.num_players {
            let candidate = PlayerId::new(((self.turn.index() + step) % self.num_players) as u8);
            if self.is_alive(candidate) {
                self.turn = candidate;
                return;
            }
        }
    }

    /// Total cards across hands, deck and discards. Always 15.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.hands.values().map(|h| h.len()).sum::<usize>() + self.deck.len() + self.discards.len()
    }
}
