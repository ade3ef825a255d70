//! Combat handlers: damage, life gain, stat changes.

use crate::cards::Stat;
use crate::continuous::{Modifier, ModifierDuration, ModifierKind};
use crate::core::{GameState, InvariantViolation};
use crate::effects::executor::{EffectContext, Resolved};
use crate::effects::mutation::Mutation;

pub fn damage(resolved: &Resolved, amount: u32) -> Result<Vec<Mutation>, InvariantViolation> {
    Ok(resolved
        .players()?
        .iter()
        .map(|&player| Mutation::Damage { player, amount, by_battle: false })
        .collect())
}

pub fn gain_life(resolved: &Resolved, amount: u32) -> Result<Vec<Mutation>, InvariantViolation> {
    Ok(resolved
        .players()?
        .iter()
        .map(|&player| Mutation::GainLife { player, amount })
        .collect())
}

/// Grant `kind` to each resolved monster on the field.
fn grant(
    state: &GameState,
    ctx: &EffectContext<'_>,
    resolved: &Resolved,
    kind: ModifierKind,
    until: ModifierDuration,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let mut mutations = Vec::new();
    for card in resolved.cards()? {
        let instance = state.require_card(card)?;
        if !instance.is_monster() {
            return Err(InvariantViolation::NotAMonster(card));
        }
        if !instance.is_on_field() {
            return Err(InvariantViolation::NotOnField(card));
        }
        mutations.push(Mutation::Grant(Modifier::new(
            ctx.source(),
            card,
            kind,
            until,
            instance.moves,
        )));
    }
    Ok(mutations)
}

pub fn modify_stat(
    state: &GameState,
    ctx: &EffectContext<'_>,
    resolved: &Resolved,
    stat: Stat,
    amount: i32,
    until: ModifierDuration,
) -> Result<Vec<Mutation>, InvariantViolation> {
    grant(state, ctx, resolved, ModifierKind::Delta { stat, amount }, until)
}

pub fn set_stat(
    state: &GameState,
    ctx: &EffectContext<'_>,
    resolved: &Resolved,
    stat: Stat,
    value: u32,
    until: ModifierDuration,
) -> Result<Vec<Mutation>, InvariantViolation> {
    grant(state, ctx, resolved, ModifierKind::Override { stat, value }, until)
}
