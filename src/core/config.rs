//! Duel configuration.
//!
//! The engine never hardcodes life totals, board sizes, or tribute thresholds.
//! Callers build a `DuelConfig` (or load one from JSON) and hand it to the
//! duel at setup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the chain decides that both players have passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassRule {
    /// Both players must pass back-to-back with no activation in between.
    #[default]
    Consecutive,
    /// A single pass by the priority holder resolves the chain. The activator
    /// is treated as having passed when it handed priority over.
    SingleFlip,
}

/// Rejected configuration values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("starting life must be positive")]
    ZeroLife,
    #[error("board needs at least one {0} zone")]
    NoZones(&'static str),
    #[error("two-tribute level {two} must exceed one-tribute level {one}")]
    TributeLevels { one: u8, two: u8 },
    #[error("hand limit {limit} is smaller than starting hand {starting}")]
    HandLimit { limit: usize, starting: usize },
    #[error("invalid config json: {0}")]
    Json(String),
}

/// Complete duel configuration.
///
/// ```
/// use duel_rules::core::DuelConfig;
///
/// let config = DuelConfig::default()
///     .with_starting_life(4000)
///     .with_first_player_draws(true);
///
/// assert_eq!(config.starting_life, 4000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Life points each player starts with.
    pub starting_life: u32,

    /// Cards drawn before the first turn.
    pub starting_hand: usize,

    /// Maximum hand size at the end of a turn.
    pub hand_limit: usize,

    /// Monster zone slots per player.
    pub monster_zones: usize,

    /// Spell/trap zone slots per player.
    pub spell_trap_zones: usize,

    /// Lowest level that needs one tribute.
    pub tribute_one_level: u8,

    /// Lowest level that needs two tributes.
    pub tribute_two_level: u8,

    /// Does the player going first draw on turn 1?
    pub first_player_draws: bool,

    /// May the player going first attack on turn 1?
    pub first_turn_battle: bool,

    /// Priority passing rule for chains.
    pub pass_rule: PassRule,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            starting_life: 8000,
            starting_hand: 5,
            hand_limit: 6,
            monster_zones: 5,
            spell_trap_zones: 5,
            tribute_one_level: 5,
            tribute_two_level: 7,
            first_player_draws: false,
            first_turn_battle: false,
            pass_rule: PassRule::Consecutive,
        }
    }
}

impl DuelConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for impossible values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_life == 0 {
            return Err(ConfigError::ZeroLife);
        }
        if self.monster_zones == 0 {
            return Err(ConfigError::NoZones("monster"));
        }
        if self.spell_trap_zones == 0 {
            return Err(ConfigError::NoZones("spell/trap"));
        }
        if self.tribute_two_level <= self.tribute_one_level {
            return Err(ConfigError::TributeLevels {
                one: self.tribute_one_level,
                two: self.tribute_two_level,
            });
        }
        if self.hand_limit < self.starting_hand {
            return Err(ConfigError::HandLimit {
                limit: self.hand_limit,
                starting: self.starting_hand,
            });
        }
        Ok(())
    }

    /// Number of tributes a normal summon of `level` needs.
    #[must_use]
    pub fn tributes_for_level(&self, level: u32) -> usize {
        if level >= u32::from(self.tribute_two_level) {
            2
        } else if level >= u32::from(self.tribute_one_level) {
            1
        } else {
            0
        }
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: u32) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_starting_hand(mut self, cards: usize) -> Self {
        self.starting_hand = cards;
        self
    }

    #[must_use]
    pub fn with_hand_limit(mut self, limit: usize) -> Self {
        self.hand_limit = limit;
        self
    }

    #[must_use]
    pub fn with_zones(mut self, monster: usize, spell_trap: usize) -> Self {
        self.monster_zones = monster;
        self.spell_trap_zones = spell_trap;
        self
    }

    #[must_use]
    pub fn with_first_player_draws(mut self, draws: bool) -> Self {
        self.first_player_draws = draws;
        self
    }

    #[must_use]
    pub fn with_first_turn_battle(mut self, allowed: bool) -> Self {
        self.first_turn_battle = allowed;
        self
    }

    #[must_use]
    pub fn with_pass_rule(mut self, rule: PassRule) -> Self {
        self.pass_rule = rule;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DuelConfig::default();
        assert_eq!(config.starting_life, 8000);
        assert_eq!(config.pass_rule, PassRule::Consecutive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tributes_for_level() {
        let config = DuelConfig::default();
        assert_eq!(config.tributes_for_level(1), 0);
        assert_eq!(config.tributes_for_level(4), 0);
        assert_eq!(config.tributes_for_level(5), 1);
        assert_eq!(config.tributes_for_level(6), 1);
        assert_eq!(config.tributes_for_level(7), 2);
        assert_eq!(config.tributes_for_level(12), 2);
    }

    #[test]
    fn test_validate_rejects_zero_life() {
        let config = DuelConfig::default().with_starting_life(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroLife));
    }

    #[test]
    fn test_validate_rejects_empty_board() {
        let config = DuelConfig::default().with_zones(0, 5);
        assert_eq!(config.validate(), Err(ConfigError::NoZones("monster")));
    }

    #[test]
    fn test_validate_rejects_small_hand_limit() {
        let config = DuelConfig::default().with_hand_limit(3);
        assert!(matches!(config.validate(), Err(ConfigError::HandLimit { .. })));
    }

    #[test]
    fn test_from_json_partial() {
        let config = DuelConfig::from_json(r#"{"starting_life": 4000, "pass_rule": "single_flip"}"#)
            .unwrap();
        assert_eq!(config.starting_life, 4000);
        assert_eq!(config.pass_rule, PassRule::SingleFlip);
        assert_eq!(config.hand_limit, 6);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            DuelConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert_eq!(
            DuelConfig::from_json(r#"{"starting_life": 0}"#),
            Err(ConfigError::ZeroLife)
        );
    }
}
