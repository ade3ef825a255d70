//! Category handlers.
//!
//! `plan` maps each `EffectAction` to the handler for its category. The match
//! is exhaustive: a new action does not compile until it is routed here.
//! Handlers only read the state and return the mutations to apply.

pub mod combat;
pub mod movement;
pub mod summon;
pub mod utility;

use crate::core::{GameState, InvariantViolation};

use super::effect::EffectAction;
use super::executor::{EffectContext, Resolved};
use super::mutation::Mutation;

/// Plan the mutations for one action node.
pub fn plan(
    state: &GameState,
    ctx: &EffectContext<'_>,
    action: &EffectAction,
    resolved: &Resolved,
) -> Result<Vec<Mutation>, InvariantViolation> {
    match action {
        // === Movement ===
        EffectAction::Draw { count } => movement::draw(state, resolved, *count),
        EffectAction::Mill { count } => movement::mill(state, resolved, *count),
        EffectAction::Discard { count } => movement::discard(state, resolved, *count),
        EffectAction::Banish => movement::banish(state, resolved),
        EffectAction::Search { filter, count } => movement::search(state, resolved, filter, *count),
        EffectAction::ReturnToDeck { placement } => {
            movement::return_to_deck(state, resolved, *placement)
        }
        EffectAction::SendToGraveyard => movement::send_to_graveyard(state, resolved),
        EffectAction::ToHand => movement::to_hand(state, resolved),

        // === Combat ===
        EffectAction::Damage { amount } => combat::damage(resolved, *amount),
        EffectAction::GainLife { amount } => combat::gain_life(resolved, *amount),
        EffectAction::ModifyStat { stat, amount, until } => {
            combat::modify_stat(state, ctx, resolved, *stat, *amount, *until)
        }
        EffectAction::SetStat { stat, value, until } => {
            combat::set_stat(state, ctx, resolved, *stat, *value, *until)
        }

        // === Summon ===
        EffectAction::SpecialSummon { position } => {
            summon::special_summon(state, resolved, *position)
        }
        EffectAction::Destroy => summon::destroy(state, resolved),

        // === Utility ===
        EffectAction::Negate => utility::negate(state, ctx, resolved),
        EffectAction::NegateAttack => utility::negate_attack(state),
    }
}
