//! Legality: what a player may do in the current state.
//!
//! The same checks back both the action API and [`legal_actions`], so an
//! enumerated action is always accepted and a rejected one is never listed.
//!
//! ## Sections
//!
//! - Activation timing (open state, response window, chain)
//! - Targets and costs
//! - Position changes
//! - Enumeration


use crate::cards::{CardKind, CardTemplate, Position, SpellKind};
use crate::core::{combinations, Action, ActionError, CardList, GameState, InstanceId, PlayerId};
use crate::effects::{CardEffect, Cost, CostResource, EffectKind, SpellSpeed};
use crate::rules::{combat, summon, DuelRules, RulesEngine};
use crate::turn::Phase;
use crate::zones::ZoneKind;

// === Activation timing ===

/// What the board is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Timing {
    /// Nothing pending; the turn player acts freely.
    Open,
    /// A response window with an empty chain.
    Window,
    /// A chain awaiting responses, with the top link's speed.
    Chain(SpellSpeed),
}

fn timing(state: &GameState) -> Result<Timing, ActionError> {
    if let Some(top) = state.chain.top() {
        return Ok(Timing::Chain(top.speed));
    }
    if state.window.is_some() {
        return Ok(Timing::Window);
    }
    if state.pending_attack.is_some() {
        return Err(ActionError::ChainInProgress);
    }
    Ok(Timing::Open)
}

/// How the activating card gets onto the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Already where it needs to be.
    Stay,
    /// A spell played from the hand.
    FromHand,
    /// A set spell or trap turned face-up.
    Flip,
}

/// An activation that passed every check except target and cost choices.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ActivationPlan<'r> {
    pub effect: &'r CardEffect,
    pub placement: Placement,
}

fn not_activatable(card: InstanceId, reason: &'static str) -> ActionError {
    ActionError::NotActivatable { card, reason }
}

/// Check that `player` may activate effect `index` of `card` now.
///
/// Priority is the caller's concern.
pub(crate) fn check_activation<'r>(
    rules: &'r DuelRules,
    state: &GameState,
    player: PlayerId,
    card: InstanceId,
    index: usize,
) -> Result<ActivationPlan<'r>, ActionError> {
    let instance = state.card(card).ok_or(ActionError::UnknownCard(card))?;
    if instance.owner != player {
        return Err(ActionError::NotOwner(card));
    }
    let template = rules
        .catalog()
        .get(instance.card)
        .ok_or(ActionError::UnknownEffect { card, effect: index })?;
    let effect = template
        .effect(index)
        .ok_or(ActionError::UnknownEffect { card, effect: index })?;
    let timing = timing(state)?;

    if instance.is_on_field() && instance.negated {
        return Err(not_activatable(card, "its effects are negated"));
    }

    let placement = match effect.kind {
        EffectKind::Trigger => {
            let offered = state.window.as_ref().and_then(|w| w.offers(card, index));
            match offered {
                Some(t) if t.controller == player && t.source_moves == instance.moves => {}
                _ => {
                    return Err(not_activatable(
                        card,
                        "trigger effects are used when their event happens",
                    ))
                }
            }
            Placement::Stay
        }
        EffectKind::Activate => activation_placement(state, template, player, card)?,
        EffectKind::Ignition | EffectKind::Quick => {
            let home = if instance.is_monster() {
                ZoneKind::MonsterZone
            } else {
                ZoneKind::SpellTrapZone
            };
            if instance.zone != home || !instance.position.is_face_up() {
                return Err(not_activatable(card, "the card must be face-up on the field"));
            }
            Placement::Stay
        }
    };

    check_timing(state, effect, player, timing)?;

    if effect.is_event_gated() {
        let answered = match (&effect.trigger, &state.window) {
            (Some(spec), Some(window)) => window.matches_event(spec, state, card, player),
            _ => false,
        };
        if !answered {
            return Err(not_activatable(card, "there is no event to respond to"));
        }
    }

    state.activations.check(card, index, effect.limit)?;

    if let Some(condition) = &effect.condition {
        if !condition.holds(state, player, card) {
            return Err(ActionError::ConditionNotMet(card));
        }
    }

    Ok(ActivationPlan { effect, placement })
}

fn check_timing(
    state: &GameState,
    effect: &CardEffect,
    player: PlayerId,
    timing: Timing,
) -> Result<(), ActionError> {
    if effect.kind == EffectKind::Trigger {
        if let Timing::Chain(_) = timing {
            state.chain.can_activate(effect.speed)?;
        }
        return Ok(());
    }

    match (effect.speed == SpellSpeed::ONE, timing) {
        (true, Timing::Open) => {
            if player != state.turn_player {
                return Err(ActionError::NotTurnPlayer(player));
            }
            if !state.phase.is_main() {
                return Err(ActionError::WrongPhase {
                    action: "activate_effect",
                    phase: state.phase,
                });
            }
            Ok(())
        }
        (true, Timing::Chain(top)) => Err(ActionError::SpellSpeedTooLow {
            speed: 1,
            required: top.value().max(2),
        }),
        (true, Timing::Window) => Err(ActionError::ChainInProgress),
        (false, Timing::Chain(_)) => state.chain.can_activate(effect.speed),
        (false, _) => Ok(()),
    }
}

/// Where a spell or trap activation comes from.
fn activation_placement(
    state: &GameState,
    template: &CardTemplate,
    player: PlayerId,
    card: InstanceId,
) -> Result<Placement, ActionError> {
    let instance = state.card(card).ok_or(ActionError::UnknownCard(card))?;
    let kind = &template.kind;

    match (instance.zone, instance.position) {
        _ if kind.is_monster() => Err(not_activatable(card, "monsters have no card activation")),
        (ZoneKind::Hand, _) => {
            if let CardKind::Trap(_) = kind {
                return Err(not_activatable(card, "traps must be set before they are activated"));
            }
            if *kind == CardKind::Spell(SpellKind::QuickPlay) && state.turn_player != player {
                return Err(not_activatable(
                    card,
                    "quick-play spells are played from the hand only during your turn",
                ));
            }
            if state.player(player).zones.free_slot(ZoneKind::SpellTrapZone).is_none() {
                return Err(ActionError::NoFreeZone(ZoneKind::SpellTrapZone));
            }
            Ok(Placement::FromHand)
        }
        (ZoneKind::SpellTrapZone, Position::FaceDown) => {
            let waits = !matches!(
                kind,
                CardKind::Spell(SpellKind::Normal | SpellKind::Continuous)
            );
            if waits && instance.set_this_turn {
                return Err(not_activatable(card, "it cannot be activated the turn it was set"));
            }
            Ok(Placement::Flip)
        }
        (ZoneKind::SpellTrapZone, _) => Err(not_activatable(card, "the card is already active")),
        _ => Err(not_activatable(
            card,
            "spells and traps are activated from the hand or the field",
        )),
    }
}

// === Targets and costs ===

/// Check chosen targets and cost cards against an effect.
pub(crate) fn check_choices(
    state: &GameState,
    effect: &CardEffect,
    player: PlayerId,
    card: InstanceId,
    targets: &[InstanceId],
    cost: &[InstanceId],
) -> Result<(), ActionError> {
    check_targets(state, effect, player, card, targets)?;
    check_cost(state, effect.cost, player, card, cost)
}

fn check_targets(
    state: &GameState,
    effect: &CardEffect,
    player: PlayerId,
    card: InstanceId,
    targets: &[InstanceId],
) -> Result<(), ActionError> {
    if targets.len() != effect.target_count() {
        return Err(ActionError::InvalidTargets("wrong number of targets"));
    }
    for (i, target) in targets.iter().enumerate() {
        if targets[..i].contains(target) {
            return Err(ActionError::InvalidTargets("the same card was chosen twice"));
        }
    }

    let mut offset = 0;
    for spec in &effect.targets {
        for &target in &targets[offset..offset + spec.count] {
            let instance = state.card(target).ok_or(ActionError::UnknownCard(target))?;
            if !spec.filter.matches(instance, player, card) {
                return Err(ActionError::InvalidTargets("target does not match the effect"));
            }
        }
        offset += spec.count;
    }
    Ok(())
}

fn check_cost(
    state: &GameState,
    cost: Option<Cost>,
    player: PlayerId,
    card: InstanceId,
    paid: &[InstanceId],
) -> Result<(), ActionError> {
    let named = cost.map_or(0, |c| c.cards_named());
    if paid.len() != named {
        return Err(ActionError::CannotPayCost("wrong number of cost cards"));
    }
    let Some(cost) = cost else {
        return Ok(());
    };

    match cost.resource {
        CostResource::LifePoints => {
            if state.player(player).life < cost.amount {
                return Err(ActionError::CannotPayCost("not enough life points"));
            }
        }
        CostResource::Hand | CostResource::Field => {
            let (zone, reason) = if cost.resource == CostResource::Hand {
                (ZoneKind::Hand, "cost cards must come from your hand")
            } else {
                (ZoneKind::MonsterZone, "cost monsters must come from your field")
            };
            for (i, &id) in paid.iter().enumerate() {
                let fits = id != card
                    && !paid[..i].contains(&id)
                    && state
                        .card(id)
                        .is_some_and(|c| c.owner == player && c.zone == zone);
                if !fits {
                    return Err(ActionError::CannotPayCost(reason));
                }
            }
        }
        CostResource::This => {
            let gone = state
                .card(card)
                .map_or(true, |c| matches!(c.zone, ZoneKind::Graveyard | ZoneKind::Banished));
            if gone {
                return Err(ActionError::CannotPayCost("the card has already left play"));
            }
        }
    }
    Ok(())
}

// === Position changes ===

/// The position `card` would change to.
pub(crate) fn position_change(
    state: &GameState,
    player: PlayerId,
    card: InstanceId,
) -> Result<Position, ActionError> {
    let instance = state.card(card).ok_or(ActionError::UnknownCard(card))?;
    if instance.owner != player {
        return Err(ActionError::NotOwner(card));
    }
    if instance.zone != ZoneKind::MonsterZone {
        return Err(ActionError::CannotChangePosition("not a monster on the field"));
    }
    if instance.summoned_this_turn || instance.set_this_turn {
        return Err(ActionError::CannotChangePosition("it arrived on the field this turn"));
    }
    if instance.position_changed {
        return Err(ActionError::CannotChangePosition("it already changed position this turn"));
    }
    if instance.has_attacked {
        return Err(ActionError::CannotChangePosition("it attacked this turn"));
    }
    Ok(match instance.position {
        Position::FaceUpAttack => Position::FaceUpDefense,
        _ => Position::FaceUpAttack,
    })
}

// === Enumeration ===

fn target_choices(
    state: &GameState,
    effect: &CardEffect,
    player: PlayerId,
    card: InstanceId,
) -> Vec<CardList> {
    let mut combos = vec![CardList::new()];
    for spec in &effect.targets {
        let candidates: Vec<InstanceId> = state
            .cards
            .iter()
            .filter(|c| spec.filter.matches(c, player, card))
            .map(|c| c.id)
            .collect();
        let picks = combinations(&candidates, spec.count);

        let mut next = Vec::new();
        for base in &combos {
            for pick in &picks {
                if pick.iter().any(|id| base.contains(id)) {
                    continue;
                }
                let mut combo = base.clone();
                combo.extend(pick.iter().copied());
                next.push(combo);
            }
        }
        combos = next;
    }
    combos
}

fn cost_choices(state: &GameState, cost: Option<Cost>, player: PlayerId, card: InstanceId) -> Vec<CardList> {
    let zones = &state.player(player).zones;
    let candidates: Vec<InstanceId> = match cost.map(|c| c.resource) {
        Some(CostResource::Hand) => zones.hand.iter().copied().filter(|&id| id != card).collect(),
        Some(CostResource::Field) => zones.monsters().filter(|&id| id != card).collect(),
        _ => return vec![CardList::new()],
    };
    combinations(&candidates, cost.map_or(0, |c| c.cards_named()))
}

/// Every activation `player` could make now, ignoring priority.
pub(crate) fn activations(rules: &DuelRules, state: &GameState, player: PlayerId) -> Vec<Action> {
    let mut out = Vec::new();
    for instance in state.cards.iter().filter(|c| c.owner == player) {
        let Some(template) = rules.catalog().get(instance.card) else {
            continue;
        };
        let card = instance.id;
        for index in 0..template.effects.len() {
            let Ok(plan) = check_activation(rules, state, player, card, index) else {
                continue;
            };
            let costs = cost_choices(state, plan.effect.cost, player, card);
            for targets in target_choices(state, plan.effect, player, card) {
                for cost in &costs {
                    if check_choices(state, plan.effect, player, card, &targets, cost).is_ok() {
                        out.push(Action::ActivateEffect {
                            card,
                            effect: index,
                            targets: targets.clone(),
                            cost: cost.clone(),
                        });
                    }
                }
            }
        }
    }
    out
}

/// Could `player` activate anything right now?
#[must_use]
pub(crate) fn has_response(rules: &DuelRules, state: &GameState, player: PlayerId) -> bool {
    !activations(rules, state, player).is_empty()
}

fn turn_actions(rules: &DuelRules, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let zones = &state.player(player).zones;
    let config = rules.config();

    if state.phase.is_main() {
        let candidates = summon::tribute_candidates(state, player);
        for card in zones.hand.iter().copied() {
            let Some(instance) = state.card(card) else {
                continue;
            };
            if instance.is_monster() {
                let required = config.tributes_for_level(instance.base.level);
                for tributes in combinations(&candidates, required) {
                    if summon::validate_normal_summon(state, config, player, card, &tributes).is_ok() {
                        out.push(Action::NormalSummon { card, tributes: tributes.clone() });
                        out.push(Action::SetCard { card, tributes });
                    }
                }
                if summon::validate_special_summon(state, rules.catalog(), player, card).is_ok() {
                    out.push(Action::SpecialSummon { card });
                }
            } else if summon::validate_spell_set(state, player, card).is_ok() {
                out.push(Action::SetCard { card, tributes: CardList::new() });
            }
        }
        for card in zones.monsters() {
            if position_change(state, player, card).is_ok() {
                out.push(Action::ChangePosition { card });
            }
        }
    }

    if state.phase == Phase::Battle {
        for attacker in zones.monsters() {
            for target in combat::attack_targets(state, player) {
                if combat::validate_attack(state, player, attacker, target).is_ok() {
                    out.push(Action::DeclareAttack { attacker, target });
                }
            }
        }
    }

    match state.phase {
        Phase::Main1 => {
            if state.turn > 1 || config.first_turn_battle {
                out.push(Action::EnterBattlePhase);
            }
            out.push(Action::EndTurn);
        }
        Phase::Battle => {
            out.push(Action::EnterMainPhase2);
            out.push(Action::EndTurn);
        }
        Phase::Main2 => out.push(Action::EndTurn),
        _ => {}
    }
}

/// Every action `player` may take now. `Forfeit` is always available while
/// the duel runs and is not listed.
#[must_use]
pub fn legal_actions(rules: &DuelRules, state: &GameState, player: PlayerId) -> Vec<Action> {
    if state.outcome.is_some() {
        return Vec::new();
    }
    if state.priority_holder() != player {
        return Vec::new();
    }

    let mut actions = Vec::new();
    if !state.chain.is_empty() || state.window.is_some() {
        actions.push(Action::PassPriority);
    }
    actions.extend(activations(rules, state, player));
    if state.is_open() && player == state.turn_player {
        turn_actions(rules, state, player, &mut actions);
    }
    actions
}
