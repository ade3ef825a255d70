//! Catalog loading and effect DSL behavior in play.

mod common;

use std::sync::Arc;

use common::*;
use duel_rules::cards::{CardCatalog, CardId};
use duel_rules::core::DuelConfig;
use duel_rules::duel::{Duel, DuelBuilder};
use duel_rules::effects::parser::ParseErrorKind;

// =============================================================================
// Catalog loading
// =============================================================================

#[test]
fn test_bad_cards_rejected_good_cards_kept() {
    let json = r#"[
      {"id": 1, "name": "Fine", "kind": "monster", "level": 4, "atk": 1000, "def": 1000},
      {"id": 2, "name": "Broken", "kind": "spell",
       "effects": [{"type": "activate", "effect": {"action": "explode"}}]},
      {"id": 3, "name": "Also Fine", "kind": "trap",
       "effects": [{"type": "activate", "effect": {"action": "draw", "count": 1}}]}
    ]"#;
    let load = CardCatalog::from_json_str(json).unwrap();

    assert_eq!(load.catalog.len(), 2);
    assert!(load.catalog.contains(CardId(1)));
    assert!(load.catalog.contains(CardId(3)));
    assert_eq!(load.rejected.len(), 1);

    let rejected = &load.rejected[0];
    assert_eq!(rejected.card, Some(CardId(2)));
    assert_eq!(rejected.index, 1);
    assert_eq!(rejected.errors[0].path, "effects[0].effect.action");
    assert_eq!(rejected.errors[0].kind, ParseErrorKind::UnknownAction("explode".into()));
}

#[test]
fn test_duplicate_id_keeps_first() {
    let json = r#"[
      {"id": 5, "name": "First", "kind": "monster", "level": 4, "atk": 1000, "def": 1000},
      {"id": 5, "name": "Second", "kind": "monster", "level": 4, "atk": 2000, "def": 1000}
    ]"#;
    let load = CardCatalog::from_json_str(json).unwrap();

    assert_eq!(load.catalog.get(CardId(5)).unwrap().name, "First");
    assert_eq!(load.rejected[0].errors[0].kind, ParseErrorKind::DuplicateId(CardId(5)));
}

#[test]
fn test_document_errors() {
    let err = CardCatalog::from_json_str("{\"id\": 1}").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Document(_)));
    assert_eq!(err.path, "$");

    assert!(CardCatalog::from_json_str("[{").is_err());
    assert!(CardCatalog::from_json_str("[]").unwrap().catalog.is_empty());
}

#[test]
fn test_every_error_in_a_card_is_reported() {
    let json = r#"[
      {"id": 8, "name": "Mess", "kind": "spell",
       "effects": [
         {"type": "activate", "cost": {"resource": "mana", "amount": 1},
          "effect": {"sequence": [
            {"action": "damage", "amount": 100, "target": "sideways"},
            {"ref": "nowhere"}
          ]}}
       ]}
    ]"#;
    let load = CardCatalog::from_json_str(json).unwrap();
    let paths: Vec<&str> = load.rejected[0].errors.iter().map(|e| e.path.as_str()).collect();

    assert!(paths.contains(&"effects[0].cost.resource"));
    assert!(paths.contains(&"effects[0].effect.sequence[0].target"));
    assert!(paths.contains(&"effects[0].effect.sequence[1].ref"));
}

#[test]
fn test_sample_catalog_loads() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 18);
    let ids: Vec<CardId> = catalog.templates().iter().map(|t| t.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// DSL in play
// =============================================================================

const DESPERATION: u32 = 400;

const BRANCHING: &str = r#"[
  {"id": 109, "name": "Pebble", "kind": "monster", "level": 2, "atk": 300, "def": 300},
  {"id": 400, "name": "Desperation", "kind": "spell",
   "subeffects": {"heal": {"action": "gain_life", "amount": 2000, "target": "controller"}},
   "effects": [{"type": "activate",
                "effect": {"if": {"life_at_most": 2000},
                           "then": {"ref": "heal"},
                           "else": {"action": "damage", "amount": 300, "target": "opponent"}}}]}
]"#;

fn branching_duel(config: DuelConfig) -> Duel {
    let load = CardCatalog::from_json_str(BRANCHING).unwrap();
    assert!(load.rejected.is_empty());
    DuelBuilder::new(Arc::new(load.catalog), config)
        .with_deck(P1, deck(&[DESPERATION]))
        .with_deck(P2, deck(&[]))
        .build()
        .unwrap()
}

#[test]
fn test_conditional_takes_else_branch() {
    let mut duel = branching_duel(DuelConfig::default());
    let spell = in_hand(&duel, P1, DESPERATION);
    duel.activate_effect(P1, spell, 0, &[], &[]).unwrap();
    settle(&mut duel);

    assert_eq!(life(&duel, P1), 8000);
    assert_eq!(life(&duel, P2), 7700);
}

#[test]
fn test_conditional_takes_then_branch_through_ref() {
    let mut duel = branching_duel(DuelConfig::default().with_starting_life(2000));
    let spell = in_hand(&duel, P1, DESPERATION);
    duel.activate_effect(P1, spell, 0, &[], &[]).unwrap();
    settle(&mut duel);

    assert_eq!(life(&duel, P1), 4000);
    assert_eq!(life(&duel, P2), 2000);
}
