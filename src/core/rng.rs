//! Deterministic randomness for deck shuffles.
//!
//! The only random operation in a duel is shuffling a deck. To keep
//! `GameState` a plain serializable value, the RNG is stored as a seed plus a
//! stream counter: every shuffle opens a fresh ChaCha8 stream derived from
//! `(seed, counter)`, exactly like forking. Replaying the same actions from the
//! same seed therefore reproduces every shuffle.
//!
//! ```
//! use duel_rules::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//!
//! let mut deck_a = vec![1, 2, 3, 4, 5, 6, 7, 8];
//! let mut deck_b = deck_a.clone();
//! a.shuffle(&mut deck_a);
//! b.shuffle(&mut deck_b);
//!
//! assert_eq!(deck_a, deck_b);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic, serializable RNG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    seed: u64,
    streams: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, streams: 0 }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of streams consumed so far.
    #[must_use]
    pub fn streams(&self) -> u64 {
        self.streams
    }

    /// Open the next independent stream.
    fn next_stream(&mut self) -> ChaCha8Rng {
        self.streams += 1;
        let stream_seed = self.seed.wrapping_add(self.streams.wrapping_mul(STREAM_MIX));
        ChaCha8Rng::seed_from_u64(stream_seed)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let mut stream = self.next_stream();
        slice.shuffle(&mut stream);
    }
}
