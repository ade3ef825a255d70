//! Atomic state mutations.
//!
//! Handlers never touch the state. They return a list of `Mutation`s which
//! the executor applies in order to a working copy; any failure discards the
//! copy, so an effect applies completely or not at all. The duel flow uses
//! the same mutations for summons, costs and battle so every change is
//! logged the same way.

use tracing::debug;

use crate::cards::{DestructionCause, Position};
use crate::continuous::Modifier;
use crate::core::{GameState, InstanceId, InvariantViolation, PlayerId};
use crate::triggers::{GameEvent, SummonKind};
use crate::zones::{ZoneKind, ZonePosition};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    // === Movement ===
    /// Move a card off the field or between piles.
    MoveCard { card: InstanceId, to: ZoneKind, place: ZonePosition },
    /// Top of deck to hand.
    Draw { player: PlayerId, card: InstanceId },
    ShuffleDeck(PlayerId),

    // === Placement ===
    Summon { card: InstanceId, position: Position, kind: SummonKind },
    SetMonster { card: InstanceId },
    /// Put a spell or trap into the spell/trap zone.
    Place { card: InstanceId, face_up: bool },
    ChangePosition { card: InstanceId, position: Position },

    // === Life ===
    Damage { player: PlayerId, amount: u32, by_battle: bool },
    GainLife { player: PlayerId, amount: u32 },
    PayLife { player: PlayerId, amount: u32 },

    // === Modifiers and destruction ===
    Grant(Modifier),
    MarkDestroyed { card: InstanceId, cause: DestructionCause },

    // === Chain and battle ===
    NegateLink(usize),
    NegateAttack,
}

/// Position a card takes when it arrives in a pile.
fn pile_position(zone: ZoneKind) -> Position {
    if zone.is_hidden() {
        Position::FaceDown
    } else {
        Position::FaceUp
    }
}

impl Mutation {
    /// Apply to `state`, logging the matching events.
    pub fn apply(&self, state: &mut GameState) -> Result<(), InvariantViolation> {
        match *self {
            Mutation::MoveCard { card, to, place } => {
                let from = state.relocate(card, to, place, pile_position(to))?;
                state.record(GameEvent::CardMoved { card, from, to });
            }
            Mutation::Draw { player, card } => {
                if state.player(player).zones.top_of_deck() != Some(card) {
                    return Err(InvariantViolation::NotInZone { card, zone: ZoneKind::Deck });
                }
                state.relocate(card, ZoneKind::Hand, ZonePosition::Top, Position::FaceDown)?;
                state.record(GameEvent::CardDrawn { player, card });
            }
            Mutation::ShuffleDeck(player) => {
                let GameState { players, rng, .. } = state;
                players[player].zones.shuffle_deck(rng);
                state.record(GameEvent::DeckShuffled { player });
            }
            Mutation::Summon { card, position, kind } => {
                let owner = state.require_card(card)?.owner;
                if !state.require_card(card)?.is_monster() {
                    return Err(InvariantViolation::NotAMonster(card));
                }
                state.relocate(card, ZoneKind::MonsterZone, ZonePosition::Top, position)?;
                if let Some(instance) = state.card_mut(card) {
                    instance.summoned_this_turn = true;
                }
                state.record(GameEvent::Summoned { card, player: owner, kind });
            }
            Mutation::SetMonster { card } => {
                let owner = state.require_card(card)?.owner;
                state.relocate(
                    card,
                    ZoneKind::MonsterZone,
                    ZonePosition::Top,
                    Position::FaceDownDefense,
                )?;
                if let Some(instance) = state.card_mut(card) {
                    instance.set_this_turn = true;
                }
                state.record(GameEvent::CardSet { card, player: owner });
            }
            Mutation::Place { card, face_up } => {
                let owner = state.require_card(card)?.owner;
                let position = if face_up { Position::FaceUp } else { Position::FaceDown };
                state.relocate(card, ZoneKind::SpellTrapZone, ZonePosition::Top, position)?;
                if !face_up {
                    if let Some(instance) = state.card_mut(card) {
                        instance.set_this_turn = true;
                    }
                    state.record(GameEvent::CardSet { card, player: owner });
                }
            }
            Mutation::ChangePosition { card, position } => {
                let instance = state.card_mut(card).ok_or(InvariantViolation::MissingCard(card))?;
                if !instance.is_on_field() {
                    return Err(InvariantViolation::NotOnField(card));
                }
                instance.position = position;
                state.record(GameEvent::PositionChanged { card, position });
            }
            Mutation::Damage { player, amount, by_battle } => {
                let seat = state.player_mut(player);
                let dealt = amount.min(seat.life);
                seat.life -= dealt;
                if dealt > 0 {
                    debug!(%player, amount = dealt, by_battle, "damage");
                    state.record(GameEvent::Damage { player, amount: dealt, by_battle });
                }
            }
            Mutation::GainLife { player, amount } => {
                let seat = state.player_mut(player);
                seat.life = seat.life.saturating_add(amount);
                state.record(GameEvent::LifeGained { player, amount });
            }
            Mutation::PayLife { player, amount } => {
                let seat = state.player_mut(player);
                seat.life = seat.life.saturating_sub(amount);
                state.record(GameEvent::LifePaid { player, amount });
            }
            Mutation::Grant(ref modifier) => {
                state.granted.push_back(modifier.clone());
            }
            Mutation::MarkDestroyed { card, cause } => {
                let instance = state.card_mut(card).ok_or(InvariantViolation::MissingCard(card))?;
                if !instance.is_on_field() {
                    return Err(InvariantViolation::NotOnField(card));
                }
                instance.destruction.get_or_insert(cause);
            }
            Mutation::NegateLink(number) => {
                if !state.chain.negate(number) {
                    return Err(InvariantViolation::NoPreviousLink);
                }
                debug!(number, "chain link negated");
            }
            Mutation::NegateAttack => {
                let attack = state.pending_attack.take().ok_or(InvariantViolation::NoAttack)?;
                state.record(GameEvent::AttackNegated { attacker: attack.attacker });
            }
        }
        Ok(())
    }
}

/// Apply mutations in order, stopping at the first failure.
pub fn apply_all(state: &mut GameState, mutations: &[Mutation]) -> Result<(), InvariantViolation> {
    mutations.iter().try_for_each(|m| m.apply(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardKind};
    use crate::core::DuelConfig;

    fn state() -> (GameState, InstanceId) {
        let mut state = GameState::new(&DuelConfig::default(), 1, PlayerId::FIRST);
        let kind = CardKind::Monster { level: 4, atk: 1500, def: 1000 };
        let card = state.spawn(PlayerId::FIRST, CardId(100), &kind);
        (state, card)
    }

    #[test]
    fn test_draw_then_summon() {
        let (mut state, card) = state();
        apply_all(
            &mut state,
            &[
                Mutation::Draw { player: PlayerId::FIRST, card },
                Mutation::Summon { card, position: Position::FaceUpAttack, kind: SummonKind::Normal },
            ],
        )
        .unwrap();

        let instance = state.card(card).unwrap();
        assert_eq!(instance.zone, ZoneKind::MonsterZone);
        assert!(instance.summoned_this_turn);
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.pending_events.len(), 1);
    }

    #[test]
    fn test_draw_requires_top_card() {
        let (mut state, _) = state();
        let kind = CardKind::Monster { level: 1, atk: 0, def: 0 };
        let second = state.spawn(PlayerId::FIRST, CardId(101), &kind);
        let err = Mutation::Draw { player: PlayerId::FIRST, card: InstanceId(0) }
            .apply(&mut state)
            .unwrap_err();
        assert_eq!(err, InvariantViolation::NotInZone { card: InstanceId(0), zone: ZoneKind::Deck });
        assert!(Mutation::Draw { player: PlayerId::FIRST, card: second }.apply(&mut state).is_ok());
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let (mut state, _) = state();
        Mutation::Damage { player: PlayerId::SECOND, amount: 9000, by_battle: false }
            .apply(&mut state)
            .unwrap();
        assert_eq!(state.player(PlayerId::SECOND).life, 0);
        assert_eq!(
            state.log.last().unwrap().event,
            GameEvent::Damage { player: PlayerId::SECOND, amount: 8000, by_battle: false }
        );
    }

    #[test]
    fn test_mark_destroyed_requires_field() {
        let (mut state, card) = state();
        let err = Mutation::MarkDestroyed { card, cause: DestructionCause::Effect }
            .apply(&mut state)
            .unwrap_err();
        assert_eq!(err, InvariantViolation::NotOnField(card));
    }

    #[test]
    fn test_negate_attack_without_attack() {
        let (mut state, _) = state();
        assert_eq!(Mutation::NegateAttack.apply(&mut state), Err(InvariantViolation::NoAttack));
    }
}
