//! Card templates - static card data.
//!
//! `CardTemplate` holds the immutable properties of a card: its kind and
//! printed stats, its activated/triggered effects, its continuous abilities,
//! and the condition for special summoning it from the hand.
//!
//! Instance-specific data (zone, position, current stats) is stored
//! separately in `CardInstance`.

use serde::{Deserialize, Serialize};

use crate::continuous::ContinuousAbility;
use crate::effects::{CardEffect, Condition, EffectKind, SpellSpeed};

use super::attributes::StatLine;

/// Unique identifier for a card template.
///
/// This identifies the printed card, not a copy of it in a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Broad card category, used by target filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Monster,
    Spell,
    Trap,
}

impl CardCategory {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "monster" => Some(Self::Monster),
            "spell" => Some(Self::Spell),
            "trap" => Some(Self::Trap),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellKind {
    Normal,
    QuickPlay,
    Continuous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    Normal,
    Continuous,
    Counter,
}

/// What kind of card this is, with its printed stats for monsters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Monster { level: u32, atk: u32, def: u32 },
    Spell(SpellKind),
    Trap(TrapKind),
}

impl CardKind {
    #[must_use]
    pub const fn category(&self) -> CardCategory {
        match self {
            Self::Monster { .. } => CardCategory::Monster,
            Self::Spell(_) => CardCategory::Spell,
            Self::Trap(_) => CardCategory::Trap,
        }
    }

    #[must_use]
    pub const fn is_monster(&self) -> bool {
        matches!(self, Self::Monster { .. })
    }

    /// Printed stats. Spells and traps have none.
    #[must_use]
    pub const fn base_stats(&self) -> StatLine {
        match *self {
            Self::Monster { level, atk, def } => StatLine::new(atk, def, level),
            Self::Spell(_) | Self::Trap(_) => StatLine::new(0, 0, 0),
        }
    }

    /// Does the card stay on the field after its activation resolves?
    #[must_use]
    pub const fn stays_on_field(&self) -> bool {
        matches!(
            self,
            Self::Monster { .. } | Self::Spell(SpellKind::Continuous) | Self::Trap(TrapKind::Continuous)
        )
    }

    /// Spell speed an effect of the given kind has on this card.
    #[must_use]
    pub const fn default_speed(&self, effect: EffectKind) -> SpellSpeed {
        match (self, effect) {
            (_, EffectKind::Quick) => SpellSpeed::TWO,
            (Self::Trap(TrapKind::Counter), EffectKind::Activate) => SpellSpeed::THREE,
            (Self::Trap(_), EffectKind::Activate) => SpellSpeed::TWO,
            (Self::Spell(SpellKind::QuickPlay), EffectKind::Activate) => SpellSpeed::TWO,
            _ => SpellSpeed::ONE,
        }
    }
}

/// Static card template.
///
/// ## Example
///
/// ```
/// use duel_rules::cards::{CardId, CardTemplate};
///
/// let knight = CardTemplate::monster(CardId::new(1), "Vanguard Knight", 4, 1800, 1200);
/// assert!(knight.kind.is_monster());
/// assert_eq!(knight.kind.base_stats().atk, 1800);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CardTemplate {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,

    /// Activated and triggered effects, addressed by index.
    pub effects: Vec<CardEffect>,

    /// Always-on abilities while the card is face-up on the field.
    pub continuous: Vec<ContinuousAbility>,

    /// Condition for special summoning this card from the hand.
    pub special_summon: Option<Condition>,
}

impl CardTemplate {
    /// Create a template with no effects.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, kind: CardKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            effects: Vec::new(),
            continuous: Vec::new(),
            special_summon: None,
        }
    }

    /// Create a vanilla monster.
    #[must_use]
    pub fn monster(id: CardId, name: impl Into<String>, level: u32, atk: u32, def: u32) -> Self {
        Self::new(id, name, CardKind::Monster { level, atk, def })
    }

    #[must_use]
    pub fn with_effect(mut self, effect: CardEffect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_continuous(mut self, ability: ContinuousAbility) -> Self {
        self.continuous.push(ability);
        self
    }

    #[must_use]
    pub fn with_special_summon(mut self, condition: Condition) -> Self {
        self.special_summon = Some(condition);
        self
    }

    /// Get an effect by index.
    #[must_use]
    pub fn effect(&self, index: usize) -> Option<&CardEffect> {
        self.effects.get(index)
    }

    #[must_use]
    pub fn category(&self) -> CardCategory {
        self.kind.category()
    }
}
