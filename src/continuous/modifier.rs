//! Modifiers and the continuous abilities that produce them.
//!
//! A `Modifier` changes one card: it negates its effects, adds to a stat, or
//! overrides a stat. Modifiers come from two places:
//! - Continuous abilities of face-up cards, rebuilt from scratch on every
//!   recompute and never stored
//! - Resolved effects (`modify_stat`, `set_stat`, `negate` on cards), stored
//!   in `GameState::granted` until their duration runs out

use serde::{Deserialize, Serialize};

use crate::cards::Stat;
use crate::core::InstanceId;
use crate::effects::{CardFilter, Condition};

/// How long a modifier lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierDuration {
    /// While the source is face-up on the field and not negated.
    WhileSourceActive,
    EndOfTurn,
    /// Until the target leaves the field.
    UntilLeavesField,
}

impl ModifierDuration {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "end_of_turn" => Some(Self::EndOfTurn),
            "leaves_field" => Some(Self::UntilLeavesField),
            _ => None,
        }
    }
}

/// Application order. Lower layers apply first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Negation,
    Numeric,
    Override,
}

/// What a modifier does to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    Negate,
    Delta { stat: Stat, amount: i32 },
    Override { stat: Stat, value: u32 },
}

impl ModifierKind {
    #[must_use]
    pub const fn layer(&self) -> Layer {
        match self {
            Self::Negate => Layer::Negation,
            Self::Delta { .. } => Layer::Numeric,
            Self::Override { .. } => Layer::Override,
        }
    }
}

/// One active modification of one card.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    pub source: InstanceId,
    pub target: InstanceId,
    pub kind: ModifierKind,
    pub duration: ModifierDuration,
    /// Target's move count when the modifier was created.
    pub target_moves: u32,
}

impl Modifier {
    #[must_use]
    pub fn new(
        source: InstanceId,
        target: InstanceId,
        kind: ModifierKind,
        duration: ModifierDuration,
        target_moves: u32,
    ) -> Self {
        Self { source, target, kind, duration, target_moves }
    }

    #[must_use]
    pub fn layer(&self) -> Layer {
        self.kind.layer()
    }
}

/// What a continuous ability does to each affected card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaticEffect {
    Modify { stat: Stat, amount: i32 },
    Override { stat: Stat, value: u32 },
    Negate,
}

impl StaticEffect {
    #[must_use]
    pub const fn modifier_kind(self) -> ModifierKind {
        match self {
            Self::Modify { stat, amount } => ModifierKind::Delta { stat, amount },
            Self::Override { stat, value } => ModifierKind::Override { stat, value },
            Self::Negate => ModifierKind::Negate,
        }
    }
}

/// An always-on ability of a card template.
///
/// ```
/// use duel_rules::cards::Stat;
/// use duel_rules::continuous::{ContinuousAbility, StaticEffect};
/// use duel_rules::effects::{CardFilter, Side};
///
/// let banner = ContinuousAbility::new(
///     CardFilter::field_monsters(Side::Controller),
///     StaticEffect::Modify { stat: Stat::Atk, amount: 300 },
/// );
/// assert!(banner.condition.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinuousAbility {
    pub affects: CardFilter,
    pub effect: StaticEffect,
    pub condition: Option<Condition>,
}

impl ContinuousAbility {
    #[must_use]
    pub fn new(affects: CardFilter, effect: StaticEffect) -> Self {
        Self { affects, effect, condition: None }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_ordered() {
        assert!(Layer::Negation < Layer::Numeric);
        assert!(Layer::Numeric < Layer::Override);
        assert_eq!(ModifierKind::Negate.layer(), Layer::Negation);
        assert_eq!(
            ModifierKind::Override { stat: Stat::Atk, value: 0 }.layer(),
            Layer::Override
        );
    }

    #[test]
    fn test_static_effect_kind() {
        let effect = StaticEffect::Modify { stat: Stat::Def, amount: -200 };
        assert_eq!(
            effect.modifier_kind(),
            ModifierKind::Delta { stat: Stat::Def, amount: -200 }
        );
    }

    #[test]
    fn test_duration_parse() {
        assert_eq!(ModifierDuration::parse("end_of_turn"), Some(ModifierDuration::EndOfTurn));
        assert_eq!(ModifierDuration::parse("forever"), None);
    }
}
