//! Attack validation and damage calculation.
//!
//! ## Damage Calculation
//!
//! | Defender | Attacker ATK vs value | Result |
//! |---|---|---|
//! | none (direct) | - | opponent takes full ATK |
//! | attack position | higher | defender destroyed, its owner takes the difference |
//! | attack position | lower | attacker destroyed, its owner takes the difference |
//! | attack position | equal | both destroyed, no damage |
//! | defense position | higher | defender destroyed, no damage |
//! | defense position | lower | nothing destroyed, attacker's owner takes the difference |
//! | defense position | equal | nothing happens |
//!
//! A face-down defender is flipped face-up before the calculation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardInstance;
use crate::core::{ActionError, GameState, InstanceId, PlayerId};
use crate::zones::ZoneKind;

/// A declared attack waiting for its response window to close.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingAttack {
    pub attacker: InstanceId,
    pub attacker_moves: u32,
    pub target: Option<InstanceId>,
    pub target_moves: u32,
}

impl PendingAttack {
    #[must_use]
    pub fn new(attacker: &CardInstance, target: Option<&CardInstance>) -> Self {
        Self {
            attacker: attacker.id,
            attacker_moves: attacker.moves,
            target: target.map(|t| t.id),
            target_moves: target.map_or(0, |t| t.moves),
        }
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.target.is_none()
    }
}

/// What damage calculation decided.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleOutcome {
    pub destroyed: SmallVec<[InstanceId; 2]>,
    pub damage: Option<(PlayerId, u32)>,
}

/// Check an attack declaration against the board.
///
/// Phase and priority are the caller's concern.
pub fn validate_attack(
    state: &GameState,
    player: PlayerId,
    attacker: InstanceId,
    target: Option<InstanceId>,
) -> Result<(), ActionError> {
    let card = state.card(attacker).ok_or(ActionError::UnknownCard(attacker))?;
    if card.owner != player {
        return Err(ActionError::NotOwner(attacker));
    }
    if card.zone != ZoneKind::MonsterZone {
        return Err(ActionError::InvalidAttack("attacker is not on the field"));
    }
    if !card.position.is_attack() {
        return Err(ActionError::InvalidAttack("attacker is not in attack position"));
    }
    if card.has_attacked {
        return Err(ActionError::InvalidAttack("attacker has already attacked this turn"));
    }

    let defenders = state.player(player.opponent()).zones.monsters().count();
    match target {
        None if defenders > 0 => Err(ActionError::InvalidAttack(
            "cannot attack directly while the opponent controls a monster",
        )),
        None => Ok(()),
        Some(id) => {
            let defender = state.card(id).ok_or(ActionError::UnknownCard(id))?;
            if defender.owner == player || defender.zone != ZoneKind::MonsterZone {
                return Err(ActionError::InvalidAttack(
                    "target must be a monster the opponent controls",
                ));
            }
            Ok(())
        }
    }
}

/// Legal attack targets for `attacker`: opponent monsters, or `None` for a
/// direct attack when the opponent has none.
#[must_use]
pub fn attack_targets(state: &GameState, player: PlayerId) -> Vec<Option<InstanceId>> {
    let defenders: Vec<Option<InstanceId>> = state
        .player(player.opponent())
        .zones
        .monsters()
        .map(Some)
        .collect();
    if defenders.is_empty() {
        vec![None]
    } else {
        defenders
    }
}

/// Damage calculation.
///
/// `defender` must already be face-up if it was flipped.
#[must_use]
pub fn calculate(attacker: &CardInstance, defender: Option<&CardInstance>) -> BattleOutcome {
    let mut outcome = BattleOutcome::default();
    let atk = attacker.current.atk;

    let Some(defender) = defender else {
        outcome.damage = Some((attacker.owner.opponent(), atk));
        return outcome;
    };

    let value = defender.battle_value();
    if defender.position.is_defense() {
        if atk > value {
            outcome.destroyed.push(defender.id);
        } else if atk < value {
            outcome.damage = Some((attacker.owner, value - atk));
        }
        return outcome;
    }

    if atk > value {
        outcome.destroyed.push(defender.id);
        outcome.damage = Some((defender.owner, atk - value));
    } else if atk < value {
        outcome.destroyed.push(attacker.id);
        outcome.damage = Some((attacker.owner, value - atk));
    } else {
        outcome.destroyed.push(attacker.id);
        outcome.destroyed.push(defender.id);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardKind, Position};

    fn monster(id: u32, owner: PlayerId, atk: u32, def: u32, position: Position) -> CardInstance {
        let kind = CardKind::Monster { level: 4, atk, def };
        let mut card = CardInstance::new(InstanceId(id), CardId(100 + id), &kind, owner);
        card.relocate(ZoneKind::MonsterZone, Some(0), position);
        card
    }

    #[test]
    fn test_direct_attack() {
        let attacker = monster(0, PlayerId::FIRST, 1500, 1000, Position::FaceUpAttack);
        let outcome = calculate(&attacker, None);
        assert_eq!(outcome.damage, Some((PlayerId::SECOND, 1500)));
        assert!(outcome.destroyed.is_empty());
    }

    #[test]
    fn test_attack_into_weaker_defense() {
        let attacker = monster(0, PlayerId::FIRST, 1800, 1000, Position::FaceUpAttack);
        let defender = monster(1, PlayerId::SECOND, 1000, 1200, Position::FaceUpDefense);
        let outcome = calculate(&attacker, Some(&defender));
        assert_eq!(outcome.destroyed.as_slice(), &[InstanceId(1)]);
        assert_eq!(outcome.damage, None);
    }

    #[test]
    fn test_attack_into_stronger_defense() {
        let attacker = monster(0, PlayerId::FIRST, 1000, 1000, Position::FaceUpAttack);
        let defender = monster(1, PlayerId::SECOND, 500, 1600, Position::FaceUpDefense);
        let outcome = calculate(&attacker, Some(&defender));
        assert!(outcome.destroyed.is_empty());
        assert_eq!(outcome.damage, Some((PlayerId::FIRST, 600)));
    }

    #[test]
    fn test_equal_defense_does_nothing() {
        let attacker = monster(0, PlayerId::FIRST, 1200, 1000, Position::FaceUpAttack);
        let defender = monster(1, PlayerId::SECOND, 500, 1200, Position::FaceUpDefense);
        assert_eq!(calculate(&attacker, Some(&defender)), BattleOutcome::default());
    }

    #[test]
    fn test_attack_position_battles() {
        let attacker = monster(0, PlayerId::FIRST, 1800, 1000, Position::FaceUpAttack);
        let weaker = monster(1, PlayerId::SECOND, 1500, 1000, Position::FaceUpAttack);
        let outcome = calculate(&attacker, Some(&weaker));
        assert_eq!(outcome.destroyed.as_slice(), &[InstanceId(1)]);
        assert_eq!(outcome.damage, Some((PlayerId::SECOND, 300)));

        let stronger = monster(2, PlayerId::SECOND, 2000, 1000, Position::FaceUpAttack);
        let outcome = calculate(&attacker, Some(&stronger));
        assert_eq!(outcome.destroyed.as_slice(), &[InstanceId(0)]);
        assert_eq!(outcome.damage, Some((PlayerId::FIRST, 200)));
    }

    #[test]
    fn test_equal_attack_destroys_both() {
        let attacker = monster(0, PlayerId::FIRST, 1500, 1000, Position::FaceUpAttack);
        let defender = monster(1, PlayerId::SECOND, 1500, 1000, Position::FaceUpAttack);
        let outcome = calculate(&attacker, Some(&defender));
        assert_eq!(outcome.destroyed.len(), 2);
        assert_eq!(outcome.damage, None);
    }
}
