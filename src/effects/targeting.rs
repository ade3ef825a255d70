//! Effect targeting system.
//!
//! Defines how effects pick what they act on:
//! - `CardFilter`: Predicate over card instances, relative to the controller
//! - `TargetSpec`: Cards the activating player chooses at activation
//! - `TargetSelector`: How an action node finds its targets at resolution

use serde::{Deserialize, Serialize};

use crate::cards::{CardCategory, CardId, CardInstance};
use crate::core::{InstanceId, PlayerId};
use crate::zones::ZoneKind;

/// Whose cards (or which player) a filter accepts, relative to the
/// controller of the effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Controller,
    Opponent,
    #[default]
    Either,
}

impl Side {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "controller" | "own" => Some(Self::Controller),
            "opponent" => Some(Self::Opponent),
            "any" | "either" => Some(Self::Either),
            _ => None,
        }
    }

    /// Does `player` belong to this side from `controller`'s point of view?
    #[must_use]
    pub fn includes(self, controller: PlayerId, player: PlayerId) -> bool {
        match self {
            Self::Controller => player == controller,
            Self::Opponent => player != controller,
            Self::Either => true,
        }
    }

    /// Players on this side, in seat order.
    #[must_use]
    pub fn players(self, controller: PlayerId) -> Vec<PlayerId> {
        PlayerId::both().filter(|p| self.includes(controller, *p)).collect()
    }
}

/// Zones a filter looks at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ZoneScope {
    /// Both field rows.
    #[default]
    Field,
    Zone(ZoneKind),
}

impl ZoneScope {
    #[must_use]
    pub fn contains(self, zone: ZoneKind) -> bool {
        match self {
            Self::Field => zone.is_field(),
            Self::Zone(z) => z == zone,
        }
    }
}

/// Predicate over card instances.
///
/// ```
/// use duel_rules::effects::{CardFilter, Side};
/// use duel_rules::cards::CardCategory;
///
/// let filter = CardFilter::field_monsters(Side::Opponent).with_max_atk(1500);
/// assert_eq!(filter.category, Some(CardCategory::Monster));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CardFilter {
    pub scope: ZoneScope,
    pub side: Side,
    pub category: Option<CardCategory>,
    pub card: Option<CardId>,
    pub max_level: Option<u32>,
    pub min_atk: Option<u32>,
    pub max_atk: Option<u32>,
    /// Only face-up cards.
    pub face_up: bool,
    /// Never match the card the effect belongs to.
    pub exclude_self: bool,
}

impl CardFilter {
    /// Monsters in the monster zones of `side`.
    #[must_use]
    pub fn field_monsters(side: Side) -> Self {
        Self {
            scope: ZoneScope::Zone(ZoneKind::MonsterZone),
            side,
            category: Some(CardCategory::Monster),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_atk(mut self, atk: u32) -> Self {
        self.max_atk = Some(atk);
        self
    }

    #[must_use]
    pub fn excluding_self(mut self) -> Self {
        self.exclude_self = true;
        self
    }

    /// Does the filter accept `card` for an effect of `source` controlled by
    /// `controller`?
    #[must_use]
    pub fn matches(&self, card: &CardInstance, controller: PlayerId, source: InstanceId) -> bool {
        if self.exclude_self && card.id == source {
            return false;
        }
        if !self.scope.contains(card.zone) || !self.side.includes(controller, card.owner) {
            return false;
        }
        if self.category.is_some_and(|c| c != card.category) {
            return false;
        }
        if self.card.is_some_and(|id| id != card.card) {
            return false;
        }
        if self.face_up && !card.position.is_face_up() {
            return false;
        }
        if self.max_level.is_some_and(|max| card.current.level > max) {
            return false;
        }
        if self.min_atk.is_some_and(|min| card.current.atk < min) {
            return false;
        }
        if self.max_atk.is_some_and(|max| card.current.atk > max) {
            return false;
        }
        true
    }

    /// Ignore location and side; compare only card properties. Used for
    /// deck searches where the zone is implied.
    #[must_use]
    pub fn matches_card(&self, card: &CardInstance) -> bool {
        let relaxed = CardFilter {
            scope: ZoneScope::Zone(card.zone),
            side: Side::Either,
            exclude_self: false,
            ..self.clone()
        };
        relaxed.matches(card, card.owner, card.id)
    }
}

/// Cards the activating player chooses when activating.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetSpec {
    pub filter: CardFilter,
    pub count: usize,
}

impl TargetSpec {
    #[must_use]
    pub fn new(filter: CardFilter, count: usize) -> Self {
        Self { filter, count }
    }
}

/// What an action node resolves its targets from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetSelector {
    /// The card the effect belongs to.
    This,
    Controller,
    Opponent,
    BothPlayers,
    /// The N-th card chosen at activation.
    Chosen(usize),
    /// The chain link directly below this one (or its card).
    PreviousLink,
    /// The attacking monster of the pending attack.
    Attacker,
    /// The monster being attacked.
    AttackTarget,
    /// Every card matching the filter at resolution.
    All(CardFilter),
}

impl TargetSelector {
    /// Parse a string selector. `{"all": ...}` is handled by the parser.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(index) = name.strip_prefix("chosen:") {
            return index.parse().ok().map(Self::Chosen);
        }
        match name {
            "self" => Some(Self::This),
            "controller" => Some(Self::Controller),
            "opponent" => Some(Self::Opponent),
            "both_players" => Some(Self::BothPlayers),
            "previous_link" => Some(Self::PreviousLink),
            "attacker" => Some(Self::Attacker),
            "attack_target" => Some(Self::AttackTarget),
            _ => None,
        }
    }

    /// Does this selector produce players?
    #[must_use]
    pub fn selects_players(&self) -> bool {
        matches!(self, Self::Controller | Self::Opponent | Self::BothPlayers)
    }

    /// Does this selector produce cards?
    #[must_use]
    pub fn selects_cards(&self) -> bool {
        !self.selects_players()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKind, Position};

    fn monster(id: u32, owner: PlayerId, atk: u32) -> CardInstance {
        let kind = CardKind::Monster { level: 4, atk, def: 1000 };
        let mut card = CardInstance::new(InstanceId(id), CardId(100), &kind, owner);
        card.relocate(ZoneKind::MonsterZone, Some(0), Position::FaceUpAttack);
        card
    }

    #[test]
    fn test_side() {
        assert!(Side::Controller.includes(PlayerId::FIRST, PlayerId::FIRST));
        assert!(!Side::Opponent.includes(PlayerId::FIRST, PlayerId::FIRST));
        assert_eq!(Side::Either.players(PlayerId::SECOND).len(), 2);
        assert_eq!(Side::Opponent.players(PlayerId::SECOND), vec![PlayerId::FIRST]);
    }

    #[test]
    fn test_filter_side_and_atk() {
        let filter = CardFilter::field_monsters(Side::Opponent).with_max_atk(1500);
        let weak = monster(1, PlayerId::SECOND, 1200);
        let strong = monster(2, PlayerId::SECOND, 1800);
        let own = monster(3, PlayerId::FIRST, 1000);

        assert!(filter.matches(&weak, PlayerId::FIRST, InstanceId(0)));
        assert!(!filter.matches(&strong, PlayerId::FIRST, InstanceId(0)));
        assert!(!filter.matches(&own, PlayerId::FIRST, InstanceId(0)));
    }

    #[test]
    fn test_filter_scope() {
        let card = monster(1, PlayerId::FIRST, 1000);
        let in_graveyard = CardFilter {
            scope: ZoneScope::Zone(ZoneKind::Graveyard),
            ..CardFilter::default()
        };
        assert!(!in_graveyard.matches(&card, PlayerId::FIRST, InstanceId(9)));
        assert!(CardFilter::default().matches(&card, PlayerId::FIRST, InstanceId(9)));
    }

    #[test]
    fn test_exclude_self() {
        let card = monster(1, PlayerId::FIRST, 1000);
        let filter = CardFilter::default().excluding_self();
        assert!(!filter.matches(&card, PlayerId::FIRST, InstanceId(1)));
    }

    #[test]
    fn test_matches_card_ignores_location() {
        let kind = CardKind::Monster { level: 3, atk: 900, def: 100 };
        let in_deck = CardInstance::new(InstanceId(4), CardId(7), &kind, PlayerId::SECOND);
        let filter = CardFilter {
            category: Some(CardCategory::Monster),
            max_level: Some(4),
            ..CardFilter::default()
        };
        assert!(filter.matches_card(&in_deck));
        assert!(!filter.matches(&in_deck, PlayerId::FIRST, InstanceId(0)));
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(TargetSelector::parse("self"), Some(TargetSelector::This));
        assert_eq!(TargetSelector::parse("chosen:2"), Some(TargetSelector::Chosen(2)));
        assert_eq!(TargetSelector::parse("chosen:x"), None);
        assert_eq!(TargetSelector::parse("everyone"), None);
        assert!(TargetSelector::Opponent.selects_players());
        assert!(TargetSelector::Attacker.selects_cards());
    }
}
