//! Shared sample catalog and duel helpers for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use duel_rules::cards::{CardCatalog, CardId};
use duel_rules::core::{DuelConfig, InstanceId, PlayerId};
use duel_rules::duel::{Duel, DuelBuilder};
use duel_rules::triggers::GameEvent;
use duel_rules::zones::ZoneKind;

pub const P1: PlayerId = PlayerId::FIRST;
pub const P2: PlayerId = PlayerId::SECOND;

pub const VANGUARD: u32 = 100;
pub const SHIELD_BEARER: u32 = 101;
pub const SCOUT: u32 = 102;
pub const BEAST: u32 = 103;
pub const TITAN: u32 = 104;
pub const LONE_WOLF: u32 = 105;
pub const WATCHER: u32 = 106;
pub const MARTYR: u32 = 107;
pub const ALCHEMIST: u32 = 108;
pub const PEBBLE: u32 = 109;

pub const FIRE_BOLT: u32 = 200;
pub const POWER_UP: u32 = 201;
pub const CARD_TRADE: u32 = 202;
pub const AURA: u32 = 203;

pub const HEALING_WARD: u32 = 300;
pub const COUNTER_WARD: u32 = 301;
pub const AMBUSH: u32 = 302;
pub const SPRINKLE: u32 = 303;

pub const DECK_SIZE: usize = 20;

pub const CATALOG: &str = r#"[
  {"id": 100, "name": "Vanguard", "kind": "monster", "level": 4, "atk": 1800, "def": 1200},
  {"id": 101, "name": "Shield Bearer", "kind": "monster", "level": 4, "atk": 1000, "def": 1200},
  {"id": 102, "name": "Scout", "kind": "monster", "level": 3, "atk": 1500, "def": 1000},
  {"id": 103, "name": "Beast", "kind": "monster", "level": 6, "atk": 2400, "def": 2000},
  {"id": 104, "name": "Titan", "kind": "monster", "level": 8, "atk": 3000, "def": 2500},
  {"id": 105, "name": "Lone Wolf", "kind": "monster", "level": 4, "atk": 1400, "def": 1000,
   "special_summon": {"no_monsters": "controller"}},
  {"id": 106, "name": "Watcher", "kind": "monster", "level": 4, "atk": 1000, "def": 1000,
   "effects": [{"type": "trigger", "trigger": {"event": "summoned", "subject": "self"},
                "effect": {"action": "draw", "count": 1, "target": "controller"}}]},
  {"id": 107, "name": "Martyr", "kind": "monster", "level": 4, "atk": 1200, "def": 800,
   "effects": [{"type": "trigger",
                "trigger": {"event": "destroyed", "subject": "self", "optional": true},
                "effect": {"action": "damage", "amount": 500, "target": "opponent"}}]},
  {"id": 108, "name": "Alchemist", "kind": "monster", "level": 4, "atk": 1200, "def": 1200,
   "effects": [{"type": "ignition", "limit": "once_per_turn",
                "effect": {"action": "gain_life", "amount": 500, "target": "controller"}}]},
  {"id": 109, "name": "Pebble", "kind": "monster", "level": 2, "atk": 300, "def": 300},

  {"id": 200, "name": "Fire Bolt", "kind": "spell", "spell_type": "normal",
   "effects": [{"type": "activate",
                "effect": {"action": "damage", "amount": 500, "target": "opponent"}}]},
  {"id": 201, "name": "Power Up", "kind": "spell", "spell_type": "quick_play",
   "effects": [{"type": "activate",
                "targets": [{"zone": "field", "category": "monster", "count": 1}],
                "effect": {"action": "modify_stat", "stat": "atk", "amount": 500,
                           "target": "chosen:0"}}]},
  {"id": 202, "name": "Card Trade", "kind": "spell", "spell_type": "normal",
   "effects": [{"type": "activate", "cost": {"resource": "hand", "amount": 1},
                "effect": {"action": "draw", "count": 2, "target": "controller"}}]},
  {"id": 203, "name": "Aura", "kind": "spell", "spell_type": "continuous",
   "continuous": [{"affects": {"category": "monster", "side": "controller"},
                   "stat": "atk", "amount": 300}]},

  {"id": 300, "name": "Healing Ward", "kind": "trap", "trap_type": "normal",
   "effects": [{"type": "activate",
                "effect": {"action": "gain_life", "amount": 1000, "target": "controller"}}]},
  {"id": 301, "name": "Counter Ward", "kind": "trap", "trap_type": "counter",
   "effects": [{"type": "activate",
                "effect": {"action": "negate", "target": "previous_link"}}]},
  {"id": 302, "name": "Ambush", "kind": "trap", "trap_type": "normal",
   "effects": [{"type": "activate",
                "trigger": {"event": "attack_declared", "side": "opponent"},
                "effect": {"action": "destroy", "target": "attacker"}}]},
  {"id": 303, "name": "Sprinkle", "kind": "trap", "trap_type": "normal",
   "effects": [{"type": "activate",
                "trigger": {"event": "attack_declared", "side": "opponent"},
                "effect": {"action": "negate_attack"}}]}
]"#;

pub fn catalog() -> Arc<CardCatalog> {
    let load = CardCatalog::from_json_str(CATALOG).unwrap();
    assert!(load.rejected.is_empty(), "sample catalog rejected: {:?}", load.rejected);
    Arc::new(load.catalog)
}

/// `top` first, padded with Pebbles.
pub fn deck(top: &[u32]) -> Vec<CardId> {
    let mut cards: Vec<CardId> = top.iter().copied().map(CardId).collect();
    while cards.len() < DECK_SIZE {
        cards.push(CardId(PEBBLE));
    }
    cards
}

pub fn duel(first: &[u32], second: &[u32]) -> Duel {
    duel_with(DuelConfig::default(), first, second)
}

pub fn duel_with(config: DuelConfig, first: &[u32], second: &[u32]) -> Duel {
    DuelBuilder::new(catalog(), config)
        .with_deck(P1, deck(first))
        .with_deck(P2, deck(second))
        .with_seed(42)
        .build()
        .unwrap()
}

/// First card in `player`'s hand with the given catalog id.
pub fn in_hand(duel: &Duel, player: PlayerId, card: u32) -> InstanceId {
    find(duel, player, card, ZoneKind::Hand)
}

pub fn find(duel: &Duel, player: PlayerId, card: u32, zone: ZoneKind) -> InstanceId {
    duel.state()
        .cards
        .iter()
        .find(|c| c.owner == player && c.card == CardId(card) && c.zone == zone)
        .map(|c| c.id)
        .unwrap_or_else(|| panic!("{player} has no card {card} in {zone}"))
}

pub fn zone_of(duel: &Duel, card: InstanceId) -> ZoneKind {
    duel.state().card(card).unwrap().zone
}

pub fn life(duel: &Duel, player: PlayerId) -> u32 {
    duel.state().player(player).life
}

pub fn hand_size(duel: &Duel, player: PlayerId) -> usize {
    duel.state().player(player).zones.hand.len()
}

/// Pass for whoever holds priority until nothing is pending.
pub fn settle(duel: &mut Duel) {
    for _ in 0..16 {
        if duel.state().is_open() || duel.outcome().is_some() {
            return;
        }
        let holder = duel.state().priority_holder();
        duel.pass_priority(holder).unwrap();
    }
    panic!("duel did not settle");
}

/// End turns until it is `player`'s turn `turn`.
pub fn advance_to(duel: &mut Duel, turn: u32) {
    while duel.state().turn < turn {
        let player = duel.state().turn_player;
        duel.end_turn(player).unwrap();
        settle(duel);
    }
}

/// Chain link numbers in the order they resolved.
pub fn resolved_links(events: &[GameEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ChainLinkResolved { number, .. } => Some(*number),
            _ => None,
        })
        .collect()
}

pub fn logged(duel: &Duel) -> Vec<GameEvent> {
    duel.state().log.iter().map(|l| l.event.clone()).collect()
}
