//! Card instances - runtime card state.
//!
//! `CardInstance` is one physical copy of a card in a duel. It tracks where
//! the card is, which way up it is, its current stats after continuous
//! effects, and the per-turn flags the rules consult.
//!
//! ## Incarnations
//!
//! `moves` counts zone changes. A chain link captures the count for every
//! card it targets; if the count differs at resolution the card has left
//! (and maybe come back) and is treated as a new object.

use serde::{Deserialize, Serialize};

use super::attributes::StatLine;
use super::definition::{CardCategory, CardId, CardKind};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::zones::ZoneKind;

/// Orientation of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    FaceUpAttack,
    FaceUpDefense,
    FaceDownDefense,
    /// Face-up spell/trap, or a public card off the field.
    FaceUp,
    /// Face-down spell/trap, or a hidden card in hand/deck.
    FaceDown,
}

impl Position {
    #[must_use]
    pub const fn is_face_up(self) -> bool {
        matches!(self, Self::FaceUpAttack | Self::FaceUpDefense | Self::FaceUp)
    }

    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::FaceUpAttack)
    }

    #[must_use]
    pub const fn is_defense(self) -> bool {
        matches!(self, Self::FaceUpDefense | Self::FaceDownDefense)
    }
}

/// Why a card is waiting to be destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestructionCause {
    Battle,
    Effect,
}

/// A card instance in a duel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique instance ID.
    pub id: InstanceId,

    /// Catalog reference.
    pub card: CardId,

    pub category: CardCategory,

    /// Who brought this card into the duel. Cards always return to their
    /// owner's zones.
    pub owner: PlayerId,

    pub zone: ZoneKind,

    /// Field slot when on the field.
    pub slot: Option<usize>,

    pub position: Position,

    /// Printed stats.
    pub base: StatLine,

    /// Stats after continuous effects. Rewritten by every recompute.
    pub current: StatLine,

    /// Effects of this card are negated. Rewritten by every recompute.
    pub negated: bool,

    /// Number of zone changes so far.
    pub moves: u32,

    pub summoned_this_turn: bool,
    pub set_this_turn: bool,
    pub has_attacked: bool,
    pub position_changed: bool,

    /// Marked for destruction; the state-based sweep moves it.
    pub destruction: Option<DestructionCause>,
}

impl CardInstance {
    /// Create a card instance in its owner's deck.
    #[must_use]
    pub fn new(id: InstanceId, card: CardId, kind: &CardKind, owner: PlayerId) -> Self {
        let base = kind.base_stats();
        Self {
            id,
            card,
            category: kind.category(),
            owner,
            zone: ZoneKind::Deck,
            slot: None,
            position: Position::FaceDown,
            base,
            current: base,
            negated: false,
            moves: 0,
            summoned_this_turn: false,
            set_this_turn: false,
            has_attacked: false,
            position_changed: false,
            destruction: None,
        }
    }

    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.category == CardCategory::Monster
    }

    #[must_use]
    pub fn is_on_field(&self) -> bool {
        self.zone.is_field()
    }

    /// On the field and face-up.
    #[must_use]
    pub fn is_face_up_on_field(&self) -> bool {
        self.is_on_field() && self.position.is_face_up()
    }

    /// A monster on the field that can attack right now.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.zone == ZoneKind::MonsterZone && self.position.is_attack() && !self.has_attacked
    }

    /// Value the opponent's attacker is compared against.
    #[must_use]
    pub fn battle_value(&self) -> u32 {
        if self.position.is_defense() {
            self.current.def
        } else {
            self.current.atk
        }
    }

    /// Clear the per-turn flags.
    pub fn reset_turn_flags(&mut self) {
        self.summoned_this_turn = false;
        self.set_this_turn = false;
        self.has_attacked = false;
        self.position_changed = false;
    }

    /// Update location after a zone change. Per-turn flags and pending
    /// destruction do not follow the card.
    pub fn relocate(&mut self, zone: ZoneKind, slot: Option<usize>, position: Position) {
        self.zone = zone;
        self.slot = slot;
        self.position = position;
        self.moves += 1;
        self.reset_turn_flags();
        self.destruction = None;
        if !zone.is_field() {
            self.current = self.base;
            self.negated = false;
        }
    }
}
