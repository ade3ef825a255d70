//! Normal, tribute, special and flip summons; sets and position changes.

mod common;

use common::*;
use duel_rules::cards::{CardId, Position};
use duel_rules::core::ActionError;
use duel_rules::triggers::{GameEvent, SummonKind};
use duel_rules::zones::ZoneKind;

#[test]
fn test_second_normal_summon_rejected() {
    let mut duel = duel(&[VANGUARD, SCOUT], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    let scout = in_hand(&duel, P1, SCOUT);
    duel.normal_summon(P1, vanguard, &[]).unwrap();
    settle(&mut duel);

    let before = duel.state().clone();
    let err = duel.normal_summon(P1, scout, &[]).unwrap_err();
    assert_eq!(err, ActionError::NormalSummonUsed);
    assert_eq!(err.to_string(), "normal summon already used");
    assert_eq!(duel.state(), &before);
    assert_eq!(zone_of(&duel, scout), ZoneKind::Hand);
}

#[test]
fn test_set_monster_uses_normal_summon() {
    let mut duel = duel(&[VANGUARD, SCOUT], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.set_card(P1, vanguard, &[]).unwrap();

    let card = duel.state().card(vanguard).unwrap();
    assert_eq!(card.position, Position::FaceDownDefense);
    assert!(duel.state().player(P1).normal_summon_used);

    let scout = in_hand(&duel, P1, SCOUT);
    assert_eq!(duel.normal_summon(P1, scout, &[]).unwrap_err(), ActionError::NormalSummonUsed);
}

#[test]
fn test_tribute_summon() {
    let mut duel = duel(&[VANGUARD, BEAST], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.normal_summon(P1, vanguard, &[]).unwrap();
    settle(&mut duel);
    advance_to(&mut duel, 3);

    let beast = in_hand(&duel, P1, BEAST);
    let err = duel.normal_summon(P1, beast, &[]).unwrap_err();
    assert_eq!(err, ActionError::WrongTributeCount { required: 1, provided: 0 });

    let outcome = duel.normal_summon(P1, beast, &[vanguard]).unwrap();
    assert_eq!(zone_of(&duel, vanguard), ZoneKind::Graveyard);
    assert_eq!(zone_of(&duel, beast), ZoneKind::MonsterZone);
    assert!(outcome.events.iter().any(|l| l.event
        == GameEvent::Summoned { card: beast, player: P1, kind: SummonKind::Tribute }));
}

#[test]
fn test_tribute_must_be_own_monster() {
    let mut duel = duel(&[BEAST], &[VANGUARD]);
    advance_to(&mut duel, 2);
    let theirs = in_hand(&duel, P2, VANGUARD);
    duel.normal_summon(P2, theirs, &[]).unwrap();
    settle(&mut duel);
    advance_to(&mut duel, 3);

    let beast = in_hand(&duel, P1, BEAST);
    let err = duel.normal_summon(P1, beast, &[theirs]).unwrap_err();
    assert_eq!(err, ActionError::InvalidTribute(theirs));
}

#[test]
fn test_two_tributes_for_level_eight() {
    let mut duel = duel(&[TITAN], &[]);
    let titan = in_hand(&duel, P1, TITAN);
    let err = duel.normal_summon(P1, titan, &[]).unwrap_err();
    assert_eq!(err, ActionError::WrongTributeCount { required: 2, provided: 0 });
}

#[test]
fn test_special_summon_by_own_condition() {
    let mut duel = duel(&[LONE_WOLF, VANGUARD], &[]);
    let wolf = in_hand(&duel, P1, LONE_WOLF);
    duel.special_summon(P1, wolf).unwrap();
    settle(&mut duel);

    assert_eq!(zone_of(&duel, wolf), ZoneKind::MonsterZone);
    assert!(!duel.state().player(P1).normal_summon_used);

    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.normal_summon(P1, vanguard, &[]).unwrap();
}

#[test]
fn test_special_summon_condition_fails() {
    let mut duel = duel(&[VANGUARD, LONE_WOLF], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.normal_summon(P1, vanguard, &[]).unwrap();
    settle(&mut duel);

    let wolf = in_hand(&duel, P1, LONE_WOLF);
    let err = duel.special_summon(P1, wolf).unwrap_err();
    assert_eq!(err, ActionError::SummonConditionNotMet(CardId(LONE_WOLF)));
}

#[test]
fn test_summon_needs_turn_and_ownership() {
    let mut duel = duel(&[], &[VANGUARD]);
    let theirs = in_hand(&duel, P2, VANGUARD);
    assert_eq!(duel.normal_summon(P2, theirs, &[]).unwrap_err(), ActionError::NotTurnPlayer(P2));

    let mine = in_hand(&duel, P1, PEBBLE);
    assert_eq!(duel.normal_summon(P1, theirs, &[]).unwrap_err(), ActionError::NotOwner(theirs));
    assert!(duel.normal_summon(P1, mine, &[]).is_ok());
}

// =============================================================================
// Positions
// =============================================================================

#[test]
fn test_flip_summon_next_turn() {
    let mut duel = duel(&[VANGUARD], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.set_card(P1, vanguard, &[]).unwrap();

    let err = duel.change_position(P1, vanguard).unwrap_err();
    assert!(matches!(err, ActionError::CannotChangePosition(_)));

    advance_to(&mut duel, 3);
    let outcome = duel.change_position(P1, vanguard).unwrap();
    assert_eq!(duel.state().card(vanguard).unwrap().position, Position::FaceUpAttack);
    assert!(outcome.events.iter().any(|l| l.event
        == GameEvent::Summoned { card: vanguard, player: P1, kind: SummonKind::Flip }));

    let err = duel.change_position(P1, vanguard).unwrap_err();
    assert!(matches!(err, ActionError::CannotChangePosition(_)));
}

#[test]
fn test_change_to_defense() {
    let mut duel = duel(&[VANGUARD], &[]);
    let vanguard = in_hand(&duel, P1, VANGUARD);
    duel.normal_summon(P1, vanguard, &[]).unwrap();
    settle(&mut duel);
    advance_to(&mut duel, 3);

    duel.change_position(P1, vanguard).unwrap();
    assert_eq!(duel.state().card(vanguard).unwrap().position, Position::FaceUpDefense);
}

#[test]
fn test_set_spell_face_down() {
    let mut duel = duel(&[FIRE_BOLT], &[]);
    let spell = in_hand(&duel, P1, FIRE_BOLT);
    duel.set_card(P1, spell, &[]).unwrap();

    let card = duel.state().card(spell).unwrap();
    assert_eq!(card.zone, ZoneKind::SpellTrapZone);
    assert_eq!(card.position, Position::FaceDown);
    assert!(!duel.state().player(P1).normal_summon_used);

    // Normal spells may be flipped the turn they were set.
    duel.activate_effect(P1, spell, 0, &[], &[]).unwrap();
    settle(&mut duel);
    assert_eq!(life(&duel, P2), 7500);
}
