//! Caller-owned legal action cache.
//!
//! Enumerating legal actions walks every card a player could use, so
//! sessions that ask repeatedly (UIs, bots) keep one of these next to the
//! duel. Entries are keyed by player and stamped with the state version they
//! were computed for; a version mismatch is a miss.

use rustc_hash::FxHashMap;

use crate::core::{Action, GameState, PlayerId};
use crate::rules::{DuelRules, RulesEngine};

#[derive(Clone, Debug, Default)]
pub struct LegalActionCache {
    entries: FxHashMap<PlayerId, (u64, Vec<Action>)>,
    hits: u64,
    misses: u64,
}

impl LegalActionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Legal actions for `player` at `state.version`, computed on a miss.
    pub fn get(&mut self, rules: &DuelRules, state: &GameState, player: PlayerId) -> &[Action] {
        let fresh = self
            .entries
            .get(&player)
            .is_some_and(|(version, _)| *version == state.version);

        if fresh {
            self.hits += 1;
        } else {
            self.misses += 1;
            let actions = rules.legal_actions(state, player);
            self.entries.insert(player, (state.version, actions));
        }
        self.entries
            .get(&player)
            .map_or(&[], |(_, actions)| actions.as_slice())
    }

    /// Drop every entry, e.g. after restoring an older snapshot whose version
    /// number may collide with a cached one.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
