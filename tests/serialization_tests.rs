//! Snapshots, replay determinism and serialized views.

mod common;

use common::*;
use duel_rules::core::{Action, GameState};
use duel_rules::duel::{Duel, DuelView};

/// A mid-chain position: Fire Bolt on the chain, P2 to respond.
fn mid_chain() -> Duel {
    let mut duel = duel(&[FIRE_BOLT, VANGUARD], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.normal_summon(P1, vanguard, &[]).unwrap();
    settle(&mut duel);
    let spell = in_hand(&duel, P1, FIRE_BOLT);
    duel.activate_effect(P1, spell, 0, &[], &[]).unwrap();
    duel
}

#[test]
fn test_snapshot_round_trip() {
    let duel = mid_chain();
    let bytes = duel.snapshot().unwrap();
    let state = GameState::from_bytes(&bytes).unwrap();

    assert_eq!(&state, duel.state());
    assert_eq!(state.chain.len(), 1);

    let restored = Duel::from_state(duel.rules().clone(), state);
    assert_eq!(restored.legal_actions(P2), duel.legal_actions(P2));
}

#[test]
fn test_restore_rewinds() {
    let mut duel = mid_chain();
    let bytes = duel.snapshot().unwrap();
    let before = duel.state().clone();

    settle(&mut duel);
    assert_eq!(life(&duel, P2), 7500);

    duel.restore(&bytes).unwrap();
    assert_eq!(duel.state(), &before);
    assert_eq!(life(&duel, P2), 8000);

    settle(&mut duel);
    assert_eq!(life(&duel, P2), 7500);
}

#[test]
fn test_garbage_snapshot_rejected() {
    let mut duel = mid_chain();
    let before = duel.state().clone();
    assert!(duel.restore(&[0xff, 0x01, 0x02]).is_err());
    assert_eq!(duel.state(), &before);
}

#[test]
fn test_same_seed_same_actions_same_state() {
    let play = || {
        let mut duel = mid_chain();
        duel.perform(P2, &Action::PassPriority).unwrap();
        duel.perform(P1, &Action::PassPriority).unwrap();
        duel.perform(P1, &Action::EndTurn).unwrap();
        duel
    };
    let a = play();
    let b = play();
    assert_eq!(a.state(), b.state());
    assert_eq!(a.snapshot().unwrap(), b.snapshot().unwrap());
}

#[test]
fn test_view_serializes_to_json() {
    let duel = mid_chain();
    let view = DuelView::new(duel.state(), P2);
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["viewer"], serde_json::to_value(P2).unwrap());
    assert_eq!(json["chain"].as_array().unwrap().len(), 1);
    assert_eq!(json["players"].as_array().unwrap().len(), 2);

    let opponent_hand = json["players"][1]["hand"].as_array().unwrap();
    assert!(opponent_hand.iter().all(|card| card["card"].is_null()));
}

#[test]
fn test_outcome_view_matches_actor() {
    let mut duel = mid_chain();
    let outcome = duel.pass_priority(P2).unwrap();
    assert_eq!(outcome.view.viewer, P2);
    assert_eq!(outcome.version, duel.state().version);
    assert_eq!(outcome.view.version, duel.state().version);
}
