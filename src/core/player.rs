//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe seat index. Coup seats 2-6 players; feature tensors are always
//! padded to `MAX_PLAYERS` rows so evaluator shapes stay fixed across runs.
//!
//! ## PlayerMap
//!
//! Per-seat data storage backed by `Vec` for O(1) access.
//! Supports iteration and indexing by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Largest supported table. Feature rows are padded to this many seats.
pub const MAX_PLAYERS: usize = 6;

/// Smallest supported table.
pub const MIN_PLAYERS: usize = 2;

/// Width of a relative-target one-hot: every seat except the perspective's own.
pub const NUM_RELATIVE_TARGETS: usize = MAX_PLAYERS - 1;

/// Seat index, 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats of a `player_count` table.
    ///
    /// ```
    /// use coup_selfplay::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// Row this seat occupies in features canonicalised for `perspective`.
    ///
    /// The perspective's own row is 0; the mapping is its own inverse, see
    /// [`crate::nn::encoder::row_to_first`].
    #[must_use]
    pub const fn canonical_position(self, perspective: PlayerId) -> usize {
        (perspective.index() + MAX_PLAYERS - self.index()) % MAX_PLAYERS
    }

    /// Relative target index of `self` as seen from `perspective`.
    ///
    /// Returns `None` when `self == perspective`.
    #[must_use]
    pub const fn relative_to(self, perspective: PlayerId) -> Option<usize> {
        match self.canonical_position(perspective) {
            0 => None,
            position => Some(position - 1),
        }
    }

    /// Inverse of [`PlayerId::relative_to`].
    #[must_use]
    pub const fn from_relative(perspective: PlayerId, relative: usize) -> PlayerId {
        let position = relative + 1;
        PlayerId(((perspective.index() + MAX_PLAYERS - position) % MAX_PLAYERS) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use coup_selfplay::core::{PlayerId, PlayerMap};
///
/// let mut coins: PlayerMap<i32> = PlayerMap::with_value(3, 2);
/// coins[PlayerId::new(1)] += 3;
/// assert_eq!(coins[PlayerId::new(1)], 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= MAX_PLAYERS, "At most {MAX_PLAYERS} players supported");

        let data = (0..player_count as u8).map(|i| factory(PlayerId(i))).collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data.iter_mut().enumerate().map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over the values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Values as a `[MAX_PLAYERS]` row, unused seats filled with zero.
    #[must_use]
    pub fn padded_row(&self, value: impl Fn(&T) -> f32) -> [f32; MAX_PLAYERS] {
        let mut row = [0.0; MAX_PLAYERS];
        for (slot, item) in row.iter_mut().zip(&self.data) {
            *slot = value(item);
        }
        row
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
