//! Per-player zones and card placement.
//!
//! `PlayerZones` owns the six locations a card can occupy on one side of the
//! table:
//! - Ordered piles (deck, graveyard, banished) where the end of the vector is
//!   the top
//! - The hand, in the order cards were added
//! - Fixed-size field rows (monster and spell/trap zones) with addressable
//!   slots, where `None` is an empty slot
//!
//! The zones only track membership. Card instances record their own zone and
//! slot; `GameState` keeps the two in sync.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::entity::InstanceId;
use crate::core::rng::GameRng;

/// The locations a card instance can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Deck,
    Hand,
    MonsterZone,
    SpellTrapZone,
    Graveyard,
    Banished,
}

impl ZoneKind {
    /// Is this one of the two field rows?
    #[must_use]
    pub const fn is_field(self) -> bool {
        matches!(self, Self::MonsterZone | Self::SpellTrapZone)
    }

    /// Is the content of this zone hidden from the opponent?
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Deck | Self::Hand)
    }

    /// Name used by the effect language.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Hand => "hand",
            Self::MonsterZone => "monster_zone",
            Self::SpellTrapZone => "spell_trap_zone",
            Self::Graveyard => "graveyard",
            Self::Banished => "banished",
        }
    }

    /// Parse an effect-language zone name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "deck" => Self::Deck,
            "hand" => Self::Hand,
            "monster_zone" => Self::MonsterZone,
            "spell_trap_zone" => Self::SpellTrapZone,
            "graveyard" => Self::Graveyard,
            "banished" => Self::Banished,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a card lands in an ordered pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    Top,
    Bottom,
}

/// All zones belonging to one player.
///
/// ```
/// use duel_rules::core::InstanceId;
/// use duel_rules::zones::{PlayerZones, ZoneKind, ZonePosition};
///
/// let mut zones = PlayerZones::new(5, 5);
/// zones.insert(ZoneKind::Deck, InstanceId(1), ZonePosition::Top);
/// zones.insert(ZoneKind::Deck, InstanceId(2), ZonePosition::Top);
///
/// assert_eq!(zones.top_of_deck(), Some(InstanceId(2)));
/// assert_eq!(zones.insert(ZoneKind::MonsterZone, InstanceId(2), ZonePosition::Top), Some(0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerZones {
    /// Ordered deck; the last element is the top card.
    pub deck: Vector<InstanceId>,
    /// Hand in the order cards were added.
    pub hand: Vector<InstanceId>,
    /// Monster slots.
    pub monsters: Vector<Option<InstanceId>>,
    /// Spell/trap slots.
    pub spells: Vector<Option<InstanceId>>,
    /// Graveyard; the last element is the most recent.
    pub graveyard: Vector<InstanceId>,
    pub banished: Vector<InstanceId>,
}

impl PlayerZones {
    /// Empty zones with the given number of field slots.
    #[must_use]
    pub fn new(monster_slots: usize, spell_slots: usize) -> Self {
        Self {
            deck: Vector::new(),
            hand: Vector::new(),
            monsters: std::iter::repeat(None).take(monster_slots).collect(),
            spells: std::iter::repeat(None).take(spell_slots).collect(),
            graveyard: Vector::new(),
            banished: Vector::new(),
        }
    }

    fn pile(&self, zone: ZoneKind) -> Option<&Vector<InstanceId>> {
        match zone {
            ZoneKind::Deck => Some(&self.deck),
            ZoneKind::Hand => Some(&self.hand),
            ZoneKind::Graveyard => Some(&self.graveyard),
            ZoneKind::Banished => Some(&self.banished),
            ZoneKind::MonsterZone | ZoneKind::SpellTrapZone => None,
        }
    }

    fn pile_mut(&mut self, zone: ZoneKind) -> Option<&mut Vector<InstanceId>> {
        match zone {
            ZoneKind::Deck => Some(&mut self.deck),
            ZoneKind::Hand => Some(&mut self.hand),
            ZoneKind::Graveyard => Some(&mut self.graveyard),
            ZoneKind::Banished => Some(&mut self.banished),
            ZoneKind::MonsterZone | ZoneKind::SpellTrapZone => None,
        }
    }

    fn row(&self, zone: ZoneKind) -> Option<&Vector<Option<InstanceId>>> {
        match zone {
            ZoneKind::MonsterZone => Some(&self.monsters),
            ZoneKind::SpellTrapZone => Some(&self.spells),
            _ => None,
        }
    }

    fn row_mut(&mut self, zone: ZoneKind) -> Option<&mut Vector<Option<InstanceId>>> {
        match zone {
            ZoneKind::MonsterZone => Some(&mut self.monsters),
            ZoneKind::SpellTrapZone => Some(&mut self.spells),
            _ => None,
        }
    }

    /// Cards in a zone. Piles are bottom-first; field rows skip empty slots.
    #[must_use]
    pub fn cards(&self, zone: ZoneKind) -> Vec<InstanceId> {
        match self.row(zone) {
            Some(row) => row.iter().flatten().copied().collect(),
            None => self.pile(zone).map(|p| p.iter().copied().collect()).unwrap_or_default(),
        }
    }

    /// Number of cards in a zone.
    #[must_use]
    pub fn count(&self, zone: ZoneKind) -> usize {
        match self.row(zone) {
            Some(row) => row.iter().filter(|slot| slot.is_some()).count(),
            None => self.pile(zone).map_or(0, Vector::len),
        }
    }

    #[must_use]
    pub fn contains(&self, zone: ZoneKind, card: InstanceId) -> bool {
        match self.row(zone) {
            Some(row) => row.iter().any(|slot| *slot == Some(card)),
            None => self.pile(zone).is_some_and(|p| p.contains(&card)),
        }
    }

    /// First empty slot of a field row.
    #[must_use]
    pub fn free_slot(&self, zone: ZoneKind) -> Option<usize> {
        self.row(zone)?.iter().position(Option::is_none)
    }

    /// Put a card into a zone.
    ///
    /// Field rows take the first free slot and return it; `None` means the
    /// row is full. Piles always succeed and return the new index.
    pub fn insert(&mut self, zone: ZoneKind, card: InstanceId, position: ZonePosition) -> Option<usize> {
        if zone.is_field() {
            let slot = self.free_slot(zone)?;
            let row = self.row_mut(zone)?;
            row.set(slot, Some(card));
            return Some(slot);
        }

        let pile = self.pile_mut(zone)?;
        match position {
            ZonePosition::Top => {
                pile.push_back(card);
                Some(pile.len() - 1)
            }
            ZonePosition::Bottom => {
                pile.push_front(card);
                Some(0)
            }
        }
    }

    /// Take a card out of a zone. Returns `false` if it was not there.
    pub fn remove(&mut self, zone: ZoneKind, card: InstanceId) -> bool {
        if let Some(row) = self.row_mut(zone) {
            if let Some(slot) = row.iter().position(|s| *s == Some(card)) {
                row.set(slot, None);
                return true;
            }
            return false;
        }

        match self.pile_mut(zone) {
            Some(pile) => match pile.index_of(&card) {
                Some(index) => {
                    pile.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// The card that would be drawn next.
    #[must_use]
    pub fn top_of_deck(&self) -> Option<InstanceId> {
        self.deck.back().copied()
    }

    /// Top `count` deck cards, top first.
    #[must_use]
    pub fn deck_top(&self, count: usize) -> Vec<InstanceId> {
        self.deck.iter().rev().take(count).copied().collect()
    }

    /// The most recently added `count` hand cards, newest first.
    #[must_use]
    pub fn newest_in_hand(&self, count: usize) -> Vec<InstanceId> {
        self.hand.iter().rev().take(count).copied().collect()
    }

    /// Monsters on the field, in slot order.
    pub fn monsters(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.monsters.iter().flatten().copied()
    }

    /// Spells and traps on the field, in slot order.
    pub fn spells_and_traps(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.spells.iter().flatten().copied()
    }

    /// Everything on the field, monsters first.
    pub fn field(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.monsters().chain(self.spells_and_traps())
    }

    /// Shuffle the deck.
    pub fn shuffle_deck(&mut self, rng: &mut GameRng) {
        let mut cards: Vec<InstanceId> = self.deck.iter().copied().collect();
        rng.shuffle(&mut cards);
        self.deck = cards.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_of(n: u32) -> PlayerZones {
        let mut zones = PlayerZones::new(3, 2);
        for i in 0..n {
            zones.insert(ZoneKind::Deck, InstanceId(i), ZonePosition::Top);
        }
        zones
    }

    #[test]
    fn test_pile_order() {
        let mut zones = deck_of(3);
        assert_eq!(zones.top_of_deck(), Some(InstanceId(2)));
        assert_eq!(zones.deck_top(2), vec![InstanceId(2), InstanceId(1)]);

        zones.insert(ZoneKind::Deck, InstanceId(9), ZonePosition::Bottom);
        assert_eq!(zones.cards(ZoneKind::Deck)[0], InstanceId(9));
    }

    #[test]
    fn test_field_slots_fill_in_order() {
        let mut zones = PlayerZones::new(2, 1);
        assert_eq!(zones.insert(ZoneKind::MonsterZone, InstanceId(1), ZonePosition::Top), Some(0));
        assert_eq!(zones.insert(ZoneKind::MonsterZone, InstanceId(2), ZonePosition::Top), Some(1));
        assert_eq!(zones.insert(ZoneKind::MonsterZone, InstanceId(3), ZonePosition::Top), None);
        assert_eq!(zones.count(ZoneKind::MonsterZone), 2);
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut zones = PlayerZones::new(2, 1);
        zones.insert(ZoneKind::MonsterZone, InstanceId(1), ZonePosition::Top);
        zones.insert(ZoneKind::MonsterZone, InstanceId(2), ZonePosition::Top);

        assert!(zones.remove(ZoneKind::MonsterZone, InstanceId(1)));
        assert!(!zones.remove(ZoneKind::MonsterZone, InstanceId(1)));
        assert_eq!(zones.free_slot(ZoneKind::MonsterZone), Some(0));
        assert_eq!(zones.cards(ZoneKind::MonsterZone), vec![InstanceId(2)]);
    }

    #[test]
    fn test_remove_from_pile() {
        let mut zones = deck_of(4);
        assert!(zones.remove(ZoneKind::Deck, InstanceId(1)));
        assert!(!zones.contains(ZoneKind::Deck, InstanceId(1)));
        assert_eq!(zones.count(ZoneKind::Deck), 3);
        assert!(!zones.remove(ZoneKind::Hand, InstanceId(2)));
    }

    #[test]
    fn test_newest_in_hand() {
        let mut zones = PlayerZones::new(1, 1);
        for i in 0..4 {
            zones.insert(ZoneKind::Hand, InstanceId(i), ZonePosition::Top);
        }
        assert_eq!(zones.newest_in_hand(2), vec![InstanceId(3), InstanceId(2)]);
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut zones = deck_of(20);
        let mut rng = GameRng::new(3);
        zones.shuffle_deck(&mut rng);

        let mut cards = zones.cards(ZoneKind::Deck);
        cards.sort();
        assert_eq!(cards, (0..20).map(InstanceId).collect::<Vec<_>>());
    }

    #[test]
    fn test_zone_names() {
        for zone in [
            ZoneKind::Deck,
            ZoneKind::Hand,
            ZoneKind::MonsterZone,
            ZoneKind::SpellTrapZone,
            ZoneKind::Graveyard,
            ZoneKind::Banished,
        ] {
            assert_eq!(ZoneKind::parse(zone.name()), Some(zone));
        }
        assert_eq!(ZoneKind::parse("library"), None);
    }
}
