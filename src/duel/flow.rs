//! Action application and the settle loop.
//!
//! Every accepted action runs on a copy of the state:
//!
//! 1. Dispatch: validate and perform the action itself
//! 2. Settle: turn queued events into triggers and response windows, and
//!    resolve a pending attack once nobody can answer it
//! 3. Bump the version
//!
//! A rejected action returns the error and the caller keeps the old state.
//!
//! ## Sections
//!
//! - Entry points
//! - Turn-player actions
//! - Activation
//! - Priority, windows and chains
//! - Battle

use im::Vector;
use tracing::{debug, info, warn};

use crate::chain::{BoundTarget, ChainLink, PassOutcome};
use crate::continuous;
use crate::core::{Action, ActionError, GameState, InstanceId, PlayerId};
use crate::effects::{CostResource, Mutation};
use crate::rules::{combat, state_based, summon, DuelRules, GameResult, PendingAttack, RulesEngine};
use crate::triggers::{collect_triggers, GameEvent, ResponseWindow, SummonKind, TriggeredEffect, WindowPass};
use crate::turn::{self, Phase};
use crate::cards::{DestructionCause, Position};
use crate::zones::{ZoneKind, ZonePosition};

use super::legal::{self, Placement};

// === Entry points ===

/// Apply `action` for `player`, producing the next state version.
pub fn apply(
    rules: &DuelRules,
    state: &GameState,
    player: PlayerId,
    action: &Action,
) -> Result<GameState, ActionError> {
    state.ensure_running()?;

    let mut next = state.clone();
    if let Err(error) = dispatch(rules, &mut next, player, action) {
        debug!(%player, %action, reason = error.code(), %error, "action rejected");
        return Err(error);
    }
    state_based::sweep(&mut next, rules.catalog());
    settle(rules, &mut next);
    next.version += 1;

    debug!(%player, %action, version = next.version, "action accepted");
    Ok(next)
}

/// Act for a player whose clock ran out: pass if they hold priority in a
/// chain or window, otherwise end their turn.
pub fn force_timeout(
    rules: &DuelRules,
    state: &GameState,
    player: PlayerId,
) -> Result<GameState, ActionError> {
    state.ensure_running()?;

    let responding = !state.chain.is_empty() || state.window.is_some();
    let action = if responding && state.priority_holder() == player {
        Action::PassPriority
    } else if state.is_open()
        && player == state.turn_player
        && matches!(state.phase, Phase::Main1 | Phase::Battle | Phase::Main2)
    {
        Action::EndTurn
    } else {
        return Err(ActionError::NothingToTimeOut(player));
    };

    info!(%player, action = action.name(), "timeout forced");
    apply(rules, state, player, &action)
}

fn dispatch(
    rules: &DuelRules,
    state: &mut GameState,
    player: PlayerId,
    action: &Action,
) -> Result<(), ActionError> {
    match action {
        Action::Forfeit => {
            info!(%player, "forfeit");
            state_based::end_duel(state, GameResult::Winner(player.opponent()));
            Ok(())
        }
        Action::PassPriority => pass(rules, state, player),
        Action::ActivateEffect { card, effect, targets, cost } => {
            if state.priority_holder() != player {
                return Err(ActionError::NoPriority(player));
            }
            activate(rules, state, player, *card, *effect, targets, cost)
        }
        Action::DeclareAttack { attacker, target } => declare_attack(state, player, *attacker, *target),
        Action::NormalSummon { card, tributes } => {
            normal_summon(rules, state, player, *card, tributes, false)
        }
        Action::SetCard { card, tributes } => set_card(rules, state, player, *card, tributes),
        Action::SpecialSummon { card } => special_summon(rules, state, player, *card),
        Action::ChangePosition { card } => change_position(state, player, *card),
        Action::EnterBattlePhase => {
            open_turn(state, player)?;
            turn::enter_battle_phase(state, rules)
        }
        Action::EnterMainPhase2 => {
            open_turn(state, player)?;
            turn::enter_main_phase_2(state)
        }
        Action::EndTurn => {
            open_turn(state, player)?;
            turn::end_turn(state, rules)
        }
    }
}

// === Turn-player actions ===

/// The turn player acting with nothing pending.
fn open_turn(state: &GameState, player: PlayerId) -> Result<(), ActionError> {
    if player != state.turn_player {
        return Err(ActionError::NotTurnPlayer(player));
    }
    if !state.is_open() {
        return Err(ActionError::ChainInProgress);
    }
    Ok(())
}

fn main_phase(state: &GameState, action: &'static str) -> Result<(), ActionError> {
    if !state.phase.is_main() {
        return Err(ActionError::WrongPhase { action, phase: state.phase });
    }
    Ok(())
}

fn normal_summon(
    rules: &DuelRules,
    state: &mut GameState,
    player: PlayerId,
    card: InstanceId,
    tributes: &[InstanceId],
    set: bool,
) -> Result<(), ActionError> {
    open_turn(state, player)?;
    main_phase(state, if set { "set_card" } else { "normal_summon" })?;
    let plan = summon::validate_normal_summon(state, rules.config(), player, card, tributes)?;

    for &tribute in &plan.tributes {
        Mutation::MoveCard {
            card: tribute,
            to: ZoneKind::Graveyard,
            place: ZonePosition::Top,
        }
        .apply(state)?;
    }
    let placed = if set {
        Mutation::SetMonster { card }
    } else {
        Mutation::Summon { card, position: Position::FaceUpAttack, kind: plan.kind }
    };
    placed.apply(state)?;
    state.player_mut(player).normal_summon_used = true;

    info!(%player, %card, tributes = plan.tributes.len(), set, "normal summon used");
    Ok(())
}

fn set_card(
    rules: &DuelRules,
    state: &mut GameState,
    player: PlayerId,
    card: InstanceId,
    tributes: &[InstanceId],
) -> Result<(), ActionError> {
    let is_monster = state.card(card).ok_or(ActionError::UnknownCard(card))?.is_monster();
    if is_monster {
        return normal_summon(rules, state, player, card, tributes, true);
    }

    open_turn(state, player)?;
    main_phase(state, "set_card")?;
    if !tributes.is_empty() {
        return Err(ActionError::InvalidTribute(tributes[0]));
    }
    summon::validate_spell_set(state, player, card)?;
    Mutation::Place { card, face_up: false }.apply(state)?;
    debug!(%player, %card, "spell/trap set");
    Ok(())
}

fn special_summon(
    rules: &DuelRules,
    state: &mut GameState,
    player: PlayerId,
    card: InstanceId,
) -> Result<(), ActionError> {
    open_turn(state, player)?;
    main_phase(state, "special_summon")?;
    summon::validate_special_summon(state, rules.catalog(), player, card)?;
    Mutation::Summon {
        card,
        position: Position::FaceUpAttack,
        kind: SummonKind::Special,
    }
    .apply(state)?;
    info!(%player, %card, "special summon");
    Ok(())
}

fn change_position(state: &mut GameState, player: PlayerId, card: InstanceId) -> Result<(), ActionError> {
    open_turn(state, player)?;
    main_phase(state, "change_position")?;
    let position = legal::position_change(state, player, card)?;
    let flip = state.card(card).is_some_and(|c| c.position == Position::FaceDownDefense);

    Mutation::ChangePosition { card, position }.apply(state)?;
    if let Some(instance) = state.card_mut(card) {
        instance.position_changed = true;
    }
    if flip {
        info!(%player, %card, "flip summon");
        state.record(GameEvent::Summoned { card, player, kind: SummonKind::Flip });
    }
    Ok(())
}

fn declare_attack(
    state: &mut GameState,
    player: PlayerId,
    attacker: InstanceId,
    target: Option<InstanceId>,
) -> Result<(), ActionError> {
    open_turn(state, player)?;
    if state.phase != Phase::Battle {
        return Err(ActionError::WrongPhase {
            action: "declare_attack",
            phase: state.phase,
        });
    }
    combat::validate_attack(state, player, attacker, target)?;

    let attack = {
        let attacking = state.require_card(attacker)?;
        let defending = target.and_then(|t| state.card(t));
        PendingAttack::new(attacking, defending)
    };
    if let Some(instance) = state.card_mut(attacker) {
        instance.has_attacked = true;
    }
    state.pending_attack = Some(attack);

    info!(%player, %attacker, target = ?target, "attack declared");
    state.record(GameEvent::AttackDeclared { attacker, target });
    Ok(())
}

// === Activation ===

fn activate(
    rules: &DuelRules,
    state: &mut GameState,
    player: PlayerId,
    card: InstanceId,
    index: usize,
    targets: &[InstanceId],
    cost: &[InstanceId],
) -> Result<(), ActionError> {
    let plan = legal::check_activation(rules, state, player, card, index)?;
    legal::check_choices(state, plan.effect, player, card, targets, cost)?;
    let effect = plan.effect;

    state.record(GameEvent::EffectActivated { card, effect: index, player });
    match plan.placement {
        Placement::FromHand => Mutation::Place { card, face_up: true }.apply(state)?,
        Placement::Flip => Mutation::ChangePosition { card, position: Position::FaceUp }.apply(state)?,
        Placement::Stay => {}
    }

    if let Some(cost_def) = effect.cost {
        let mutations: Vec<Mutation> = match cost_def.resource {
            CostResource::LifePoints => vec![Mutation::PayLife { player, amount: cost_def.amount }],
            CostResource::Hand | CostResource::Field | CostResource::This => {
                let cards: Vec<InstanceId> = if cost_def.resource == CostResource::This {
                    vec![card]
                } else {
                    cost.to_vec()
                };
                cards
                    .into_iter()
                    .map(|c| Mutation::MoveCard {
                        card: c,
                        to: ZoneKind::Graveyard,
                        place: ZonePosition::Top,
                    })
                    .collect()
            }
        };
        for mutation in &mutations {
            mutation.apply(state)?;
        }
    }

    state.activations.record(card, index);
    if let Some(window) = state.window.as_mut() {
        window.take(card, index);
    }

    let source = state.require_card(card)?;
    let link = ChainLink::new(card, source.moves, source.card, index, player, effect.speed)
        .with_targets(targets.iter().filter_map(|&t| {
            state.card(t).map(|c| BoundTarget { card: t, moves: c.moves })
        }));
    push_link(state, link)?;

    state_based::sweep(state, rules.catalog());
    Ok(())
}

fn push_link(state: &mut GameState, link: ChainLink) -> Result<usize, ActionError> {
    let card = link.source;
    let speed = link.speed.value();
    let number = state.chain.push(link)?;
    state.record(GameEvent::ChainLinkAdded { number, card, speed });
    Ok(number)
}

/// Put a mandatory trigger on the chain, paying its cost. Unpayable
/// triggers are skipped.
fn chain_trigger(rules: &DuelRules, state: &mut GameState, trigger: &TriggeredEffect) {
    let effect = rules
        .catalog()
        .get(trigger.card)
        .and_then(|t| t.effect(trigger.effect));
    let Some(effect) = effect else {
        return;
    };

    let mut working = state.clone();
    let paid = match effect.cost {
        None => Ok(()),
        Some(cost) if cost.resource == CostResource::LifePoints => {
            if working.player(trigger.controller).life < cost.amount {
                Err(ActionError::CannotPayCost("not enough life points"))
            } else {
                Mutation::PayLife { player: trigger.controller, amount: cost.amount }
                    .apply(&mut working)
                    .map_err(ActionError::from)
            }
        }
        Some(_) => Mutation::MoveCard {
            card: trigger.source,
            to: ZoneKind::Graveyard,
            place: ZonePosition::Top,
        }
        .apply(&mut working)
        .map_err(ActionError::from),
    };

    let pushed = paid.and_then(|()| {
        working.record(GameEvent::EffectActivated {
            card: trigger.source,
            effect: trigger.effect,
            player: trigger.controller,
        });
        working.activations.record(trigger.source, trigger.effect);
        let moves = working.card(trigger.source).map_or(trigger.source_moves, |c| c.moves);
        let link = ChainLink::new(
            trigger.source,
            moves,
            trigger.card,
            trigger.effect,
            trigger.controller,
            trigger.speed,
        );
        push_link(&mut working, link)
    });

    match pushed {
        Ok(number) => {
            debug!(number, source = %trigger.source, "mandatory trigger chained");
            *state = working;
        }
        Err(error) => warn!(source = %trigger.source, %error, "mandatory trigger skipped"),
    }
}

// === Priority, windows and chains ===

/// Drive the state until it waits on a player.
pub(crate) fn settle(rules: &DuelRules, state: &mut GameState) {
    loop {
        if state.outcome.is_some() {
            let turn_player = state.turn_player;
            state.chain.finish(turn_player);
            state.window = None;
            state.pending_attack = None;
            state.pending_events.clear();
            return;
        }
        if !state.chain.is_empty() || state.window.is_some() {
            return;
        }

        if !state.pending_events.is_empty() {
            open_window(rules, state);
            continue;
        }
        if state.pending_attack.is_some() {
            resolve_attack(rules, state);
            continue;
        }
        return;
    }
}

/// Check queued events for triggers and open a response window.
fn open_window(rules: &DuelRules, state: &mut GameState) {
    let events: Vector<GameEvent> = std::mem::take(&mut state.pending_events);
    let batch: Vec<GameEvent> = events.iter().cloned().collect();
    let triggers = collect_triggers(state, rules.catalog(), &batch);

    let (optional, mandatory): (Vec<TriggeredEffect>, Vec<TriggeredEffect>) =
        triggers.into_iter().partition(|t| t.optional);
    for trigger in &mandatory {
        chain_trigger(rules, state, trigger);
    }

    state.window = Some(ResponseWindow::new(
        events,
        optional.into_iter().collect(),
        state.turn_player,
    ));
    if !state.chain.is_empty() {
        let holder = state.turn_player;
        debug!(%holder, links = state.chain.len(), "response window opened under chained triggers");
        state.record(GameEvent::WindowOpened { holder });
        return;
    }

    advance_window(rules, state);
    if let Some(window) = &state.window {
        let holder = window.holder;
        debug!(%holder, "response window opened");
        state.record(GameEvent::WindowOpened { holder });
    }
}

/// Pass for window holders who have nothing to activate.
fn advance_window(rules: &DuelRules, state: &mut GameState) {
    loop {
        let Some(holder) = state.window.as_ref().map(|w| w.holder) else {
            return;
        };
        if legal::has_response(rules, state, holder) {
            return;
        }
        let step = state.window.as_mut().map(|w| w.pass(holder));
        match step {
            Some(Ok(WindowPass::PriorityTo(_))) => continue,
            _ => {
                state.window = None;
                return;
            }
        }
    }
}

fn close_window(state: &mut GameState) {
    if state.window.take().is_some() {
        state.record(GameEvent::WindowClosed);
    }
}

fn pass(rules: &DuelRules, state: &mut GameState, player: PlayerId) -> Result<(), ActionError> {
    if !state.chain.is_empty() {
        let outcome = state.chain.pass(player, rules.config().pass_rule)?;
        state.record(GameEvent::PriorityPassed { player });
        if outcome == PassOutcome::Resolve {
            resolve_chain(rules, state);
        }
        return Ok(());
    }

    let window = state.window.as_mut().ok_or(ActionError::NothingToPass)?;
    let step = window.pass(player)?;
    state.record(GameEvent::PriorityPassed { player });
    match step {
        WindowPass::Closed => close_window(state),
        WindowPass::PriorityTo(_) => {
            advance_window(rules, state);
            if state.window.is_none() {
                state.record(GameEvent::WindowClosed);
            }
        }
    }
    Ok(())
}

/// Resolve every link, last activated first.
fn resolve_chain(rules: &DuelRules, state: &mut GameState) {
    state.chain.begin_resolving();
    let mut length = 0;
    while state.outcome.is_none() {
        let Some(link) = state.chain.pop() else {
            break;
        };
        length += 1;
        crate::effects::resolve_link(state, rules.catalog(), &link);
    }

    let turn_player = state.turn_player;
    state.chain.finish(turn_player);
    info!(length, "chain resolved");
    state.record(GameEvent::ChainResolved { length });
    close_window(state);
}

// === Battle ===

fn still_there(state: &GameState, card: InstanceId, moves: u32) -> bool {
    state
        .card(card)
        .is_some_and(|c| c.zone == ZoneKind::MonsterZone && c.moves == moves)
}

/// Damage calculation for the pending attack.
fn resolve_attack(rules: &DuelRules, state: &mut GameState) {
    let Some(attack) = state.pending_attack.take() else {
        return;
    };
    let attacker = attack.attacker;

    let defender_ok = match attack.target {
        Some(target) => still_there(state, target, attack.target_moves),
        None => state.player(attack_side(state, attacker).opponent()).zones.monsters().next().is_none(),
    };
    if !still_there(state, attacker, attack.attacker_moves) || !defender_ok {
        info!(%attacker, "attack cancelled");
        state.record(GameEvent::AttackCancelled { attacker });
        return;
    }

    if let Some(target) = attack.target {
        let face_down = state.card(target).is_some_and(|c| c.position == Position::FaceDownDefense);
        if face_down {
            let flipped = Mutation::ChangePosition { card: target, position: Position::FaceUpDefense }.apply(state);
            if let Err(error) = flipped {
                warn!(%target, %error, "attack target could not be flipped");
            }
            continuous::refresh(state, rules.catalog());
        }
    }

    let outcome = match state.card(attacker) {
        Some(attacking) => combat::calculate(attacking, attack.target.and_then(|t| state.card(t))),
        None => return,
    };

    let mut mutations: Vec<Mutation> = outcome
        .destroyed
        .iter()
        .map(|&card| Mutation::MarkDestroyed { card, cause: DestructionCause::Battle })
        .collect();
    if let Some((player, amount)) = outcome.damage {
        mutations.push(Mutation::Damage { player, amount, by_battle: true });
    }
    for mutation in &mutations {
        if let Err(error) = mutation.apply(state) {
            warn!(%attacker, %error, "battle mutation failed");
        }
    }

    debug!(%attacker, target = ?attack.target, damage = ?outcome.damage, "battle resolved");
    state.record(GameEvent::BattleResolved { attacker, target: attack.target });
    state_based::sweep(state, rules.catalog());
}

fn attack_side(state: &GameState, attacker: InstanceId) -> PlayerId {
    state.card(attacker).map_or(state.turn_player, |c| c.owner)
}
