//! Utility handlers: negation of activations, cards and attacks.

use crate::continuous::{Modifier, ModifierDuration, ModifierKind};
use crate::core::{GameState, InvariantViolation};
use crate::effects::executor::{EffectContext, Resolved};
use crate::effects::mutation::Mutation;

/// Negate a lower chain link, or the effects of field cards until they leave.
pub fn negate(
    state: &GameState,
    ctx: &EffectContext<'_>,
    resolved: &Resolved,
) -> Result<Vec<Mutation>, InvariantViolation> {
    if let Resolved::Link { number, .. } = resolved {
        return Ok(vec![Mutation::NegateLink(*number)]);
    }

    let mut mutations = Vec::new();
    for card in resolved.cards()? {
        let instance = state.require_card(card)?;
        if !instance.is_on_field() {
            return Err(InvariantViolation::NotOnField(card));
        }
        mutations.push(Mutation::Grant(Modifier::new(
            ctx.source(),
            card,
            ModifierKind::Negate,
            ModifierDuration::UntilLeavesField,
            instance.moves,
        )));
    }
    Ok(mutations)
}

pub fn negate_attack(state: &GameState) -> Result<Vec<Mutation>, InvariantViolation> {
    if state.pending_attack.is_none() {
        return Err(InvariantViolation::NoAttack);
    }
    Ok(vec![Mutation::NegateAttack])
}
