//! Summon handlers: special summon and destroy.

use crate::cards::{DestructionCause, Position};
use crate::core::{GameState, InvariantViolation};
use crate::effects::effect::SummonPosition;
use crate::effects::executor::Resolved;
use crate::effects::mutation::Mutation;
use crate::triggers::SummonKind;
use crate::zones::ZoneKind;

/// Special summon each resolved monster that is not already on the field.
///
/// Fails as a whole when the owner's monster zones cannot take them all.
pub fn special_summon(
    state: &GameState,
    resolved: &Resolved,
    position: SummonPosition,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let position = match position {
        SummonPosition::Attack => Position::FaceUpAttack,
        SummonPosition::Defense => Position::FaceUpDefense,
    };

    let mut mutations = Vec::new();
    for card in resolved.cards()? {
        let instance = state.require_card(card)?;
        if !instance.is_monster() {
            return Err(InvariantViolation::NotAMonster(card));
        }
        if instance.is_on_field() {
            continue;
        }
        mutations.push(Mutation::Summon { card, position, kind: SummonKind::Special });
    }
    Ok(mutations)
}

pub fn destroy(state: &GameState, resolved: &Resolved) -> Result<Vec<Mutation>, InvariantViolation> {
    let mut mutations = Vec::new();
    for card in resolved.cards()? {
        let instance = state.require_card(card)?;
        if !matches!(instance.zone, ZoneKind::MonsterZone | ZoneKind::SpellTrapZone) {
            return Err(InvariantViolation::NotOnField(card));
        }
        mutations.push(Mutation::MarkDestroyed { card, cause: DestructionCause::Effect });
    }
    Ok(mutations)
}
