//! Rules engine trait and the duel rule set.
//!
//! `RulesEngine` is the seam between callers and the rules:
//! - What actions are legal for a player
//! - How an action turns one state version into the next
//! - Whether the duel is over
//!
//! `DuelRules` is the implementation: it owns the immutable card catalog and
//! the duel configuration, and delegates to the duel flow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::CardCatalog;
use crate::core::{Action, ActionError, DuelConfig, GameState, PlayerId};

/// Result of a completed duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Both players lost in the same sweep.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Draw => false,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::Winner(p) => write!(f, "{p} wins"),
            GameResult::Draw => f.write_str("draw"),
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions`: Return empty vec if the player can't act
/// - `apply_action`: Must be deterministic; the input state is never touched
/// - `is_terminal`: Return None if the duel continues
pub trait RulesEngine {
    /// Get the duel configuration.
    fn config(&self) -> &DuelConfig;

    /// Enumerate all legal actions for a player.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action>;

    /// Apply an action, producing the next state version.
    ///
    /// On rejection the caller still holds the unchanged input state.
    fn apply_action(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<GameState, ActionError>;

    /// Check if the duel is over.
    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        state.outcome
    }
}

/// The duel rule set bound to one catalog and configuration.
///
/// Cheap to clone; the catalog is shared.
#[derive(Clone, Debug)]
pub struct DuelRules {
    catalog: Arc<CardCatalog>,
    config: DuelConfig,
}

impl DuelRules {
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, config: DuelConfig) -> Self {
        Self { catalog, config }
    }

    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn shared_catalog(&self) -> Arc<CardCatalog> {
        Arc::clone(&self.catalog)
    }
}

impl RulesEngine for DuelRules {
    fn config(&self) -> &DuelConfig {
        &self.config
    }

    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        crate::duel::legal::legal_actions(self, state, player)
    }

    fn apply_action(
        &self,
        state: &GameState,
        player: PlayerId,
        action: &Action,
    ) -> Result<GameState, ActionError> {
        crate::duel::flow::apply(self, state, player, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::SECOND);
        assert!(!result.is_winner(PlayerId::FIRST));
        assert!(result.is_winner(PlayerId::SECOND));

        let draw = GameResult::Draw;
        assert!(!draw.is_winner(PlayerId::FIRST));
        assert!(!draw.is_winner(PlayerId::SECOND));
    }

    #[test]
    fn test_game_result_display() {
        assert_eq!(GameResult::Winner(PlayerId::FIRST).to_string(), "Player 0 wins");
        assert_eq!(GameResult::Draw.to_string(), "draw");
    }
}
