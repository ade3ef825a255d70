//! Effect executor.
//!
//! Resolves one chain link:
//! 1. Skip with `Negated` if the link was negated, its effect is unknown, or
//!    its source is negated on the field
//! 2. Walk the effect tree on a working copy of the state; each action node
//!    resolves its selector, asks its category handler for mutations, applies
//!    them, and recomputes continuous effects so later nodes see the result
//! 3. Commit the copy, or drop it and log `EffectAborted` on the first
//!    invariant violation
//! 4. Send a finished spell or trap to the graveyard, then run the
//!    state-based sweep
//!
//! Trigger and response windows are opened by the duel flow once the whole
//! chain has drained.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::cards::{CardCatalog, CardKind};
use crate::chain::ChainLink;
use crate::continuous;
use crate::core::{GameState, InstanceId, InvariantViolation, PlayerId};
use crate::rules::state_based;
use crate::triggers::GameEvent;
use crate::zones::{ZoneKind, ZonePosition};

use super::effect::{EffectKind, EffectNode};
use super::handlers;
use super::mutation::{apply_all, Mutation};
use super::targeting::TargetSelector;

/// How a chain link ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectOutcome {
    Applied,
    Negated,
    Aborted,
}

/// Everything a handler may know about the resolving link.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext<'a> {
    pub catalog: &'a CardCatalog,
    pub link: &'a ChainLink,
}

impl EffectContext<'_> {
    #[must_use]
    pub fn source(&self) -> InstanceId {
        self.link.source
    }

    #[must_use]
    pub fn controller(&self) -> PlayerId {
        self.link.controller
    }
}

/// What a selector resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Players(SmallVec<[PlayerId; 2]>),
    Cards(SmallVec<[InstanceId; 4]>),
    /// A lower chain link and the card that activated it.
    Link { number: usize, card: InstanceId },
}

impl Resolved {
    pub fn players(&self) -> Result<&[PlayerId], InvariantViolation> {
        match self {
            Resolved::Players(players) => Ok(players),
            _ => Err(InvariantViolation::WrongTargetKind),
        }
    }

    pub fn cards(&self) -> Result<SmallVec<[InstanceId; 4]>, InvariantViolation> {
        match self {
            Resolved::Cards(cards) => Ok(cards.clone()),
            Resolved::Link { card, .. } => Ok(std::iter::once(*card).collect()),
            Resolved::Players(_) => Err(InvariantViolation::WrongTargetKind),
        }
    }
}

fn same_object(state: &GameState, card: InstanceId, moves: u32) -> Result<(), InvariantViolation> {
    let instance = state.require_card(card)?;
    if instance.moves != moves {
        return Err(InvariantViolation::TargetMoved(card));
    }
    Ok(())
}

/// Resolve a selector against the current state.
pub fn resolve_selector(
    state: &GameState,
    ctx: &EffectContext<'_>,
    selector: &TargetSelector,
) -> Result<Resolved, InvariantViolation> {
    let controller = ctx.controller();
    let one = |card: InstanceId| Resolved::Cards(std::iter::once(card).collect());

    match selector {
        TargetSelector::This => {
            same_object(state, ctx.source(), ctx.link.source_moves)?;
            Ok(one(ctx.source()))
        }
        TargetSelector::Controller => Ok(Resolved::Players(std::iter::once(controller).collect())),
        TargetSelector::Opponent => Ok(Resolved::Players(
            std::iter::once(controller.opponent()).collect(),
        )),
        TargetSelector::BothPlayers => Ok(Resolved::Players(
            PlayerId::starting_with(controller).collect(),
        )),
        TargetSelector::Chosen(index) => {
            let bound = ctx
                .link
                .targets
                .get(*index)
                .ok_or(InvariantViolation::WrongTargetKind)?;
            same_object(state, bound.card, bound.moves)?;
            Ok(one(bound.card))
        }
        TargetSelector::PreviousLink => {
            let number = ctx.link.number.checked_sub(1).filter(|n| *n > 0);
            let below = number
                .and_then(|n| state.chain.link(n))
                .ok_or(InvariantViolation::NoPreviousLink)?;
            Ok(Resolved::Link { number: below.number, card: below.source })
        }
        TargetSelector::Attacker => {
            let attack = state.pending_attack.ok_or(InvariantViolation::NoAttack)?;
            same_object(state, attack.attacker, attack.attacker_moves)?;
            Ok(one(attack.attacker))
        }
        TargetSelector::AttackTarget => {
            let attack = state.pending_attack.ok_or(InvariantViolation::NoAttack)?;
            let target = attack.target.ok_or(InvariantViolation::NoAttack)?;
            same_object(state, target, attack.target_moves)?;
            Ok(one(target))
        }
        TargetSelector::All(filter) => Ok(Resolved::Cards(
            state
                .cards
                .iter()
                .filter(|c| filter.matches(c, controller, ctx.source()))
                .map(|c| c.id)
                .collect(),
        )),
    }
}

fn run_node(
    state: &mut GameState,
    ctx: &EffectContext<'_>,
    node: &EffectNode,
) -> Result<(), InvariantViolation> {
    match node {
        EffectNode::Action { action, target } => {
            let resolved = resolve_selector(state, ctx, target)?;
            let mutations: Vec<Mutation> = handlers::plan(state, ctx, action, &resolved)?;
            apply_all(state, &mutations)?;
            continuous::refresh(state, ctx.catalog);
            Ok(())
        }
        EffectNode::Sequence(children) => children.iter().try_for_each(|c| run_node(state, ctx, c)),
        EffectNode::Conditional { condition, then, otherwise } => {
            if condition.holds(state, ctx.controller(), ctx.source()) {
                run_node(state, ctx, then)
            } else if let Some(otherwise) = otherwise {
                run_node(state, ctx, otherwise)
            } else {
                Ok(())
            }
        }
    }
}

/// Run an effect tree on a copy of `state`.
///
/// Returns the new state, or the violation that aborted the effect; the
/// input is never modified.
pub fn execute(
    state: &GameState,
    ctx: &EffectContext<'_>,
    root: &EffectNode,
) -> Result<GameState, InvariantViolation> {
    let mut working = state.clone();
    run_node(&mut working, ctx, root)?;
    Ok(working)
}

fn source_negated(state: &GameState, link: &ChainLink) -> bool {
    state.card(link.source).is_some_and(|card| {
        card.is_on_field() && card.moves == link.source_moves && card.negated
    })
}

/// Resolve a popped chain link against `state`.
pub fn resolve_link(state: &mut GameState, catalog: &CardCatalog, link: &ChainLink) -> EffectOutcome {
    let template = catalog.get(link.card);
    let effect = template.and_then(|t| t.effect(link.effect));

    let outcome = match effect {
        _ if link.negated => EffectOutcome::Negated,
        None => {
            warn!(card = %link.card, effect = link.effect, "chain link has no effect definition");
            EffectOutcome::Negated
        }
        Some(_) if source_negated(state, link) => EffectOutcome::Negated,
        Some(effect) => {
            let ctx = EffectContext { catalog, link };
            match execute(state, &ctx, &effect.root) {
                Ok(next) => {
                    *state = next;
                    EffectOutcome::Applied
                }
                Err(violation) => {
                    warn!(number = link.number, source = %link.source, %violation, "effect aborted");
                    state.record(GameEvent::EffectAborted {
                        number: link.number,
                        card: link.source,
                        reason: violation.to_string(),
                    });
                    EffectOutcome::Aborted
                }
            }
        }
    };

    debug!(number = link.number, source = %link.source, ?outcome, "chain link resolved");
    state.record(GameEvent::ChainLinkResolved {
        number: link.number,
        card: link.source,
        outcome,
    });

    let activated = effect.is_some_and(|e| e.kind == EffectKind::Activate);
    if let (true, Some(template)) = (activated, template) {
        finish_activation(state, &template.kind, link);
    }
    state_based::sweep(state, catalog);
    outcome
}

/// A resolved spell or trap leaves the field unless it is continuous and
/// its activation went through.
fn finish_activation(state: &mut GameState, kind: &CardKind, link: &ChainLink) {
    if kind.stays_on_field() && !link.negated {
        return;
    }
    let still_there = state.card(link.source).is_some_and(|card| {
        card.zone == ZoneKind::SpellTrapZone && card.moves == link.source_moves
    });
    if !still_there {
        return;
    }
    let moved = Mutation::MoveCard {
        card: link.source,
        to: ZoneKind::Graveyard,
        place: ZonePosition::Top,
    }
    .apply(state);
    if let Err(error) = moved {
        warn!(card = %link.source, %error, "resolved card could not leave the field");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardTemplate, Position};
    use crate::chain::BoundTarget;
    use crate::core::DuelConfig;
    use crate::effects::{CardEffect, EffectAction, SpellSpeed};

    fn setup() -> (GameState, CardCatalog) {
        let burn = CardTemplate::new(
            CardId(1),
            "Burn",
            CardKind::Spell(crate::cards::SpellKind::Normal),
        )
        .with_effect(CardEffect::new(
            EffectKind::Activate,
            SpellSpeed::ONE,
            EffectNode::action(EffectAction::Damage { amount: 500 }, TargetSelector::Opponent),
        ));
        let catalog = CardCatalog::new()
            .with(burn)
            .with(CardTemplate::monster(CardId(2), "Knight", 4, 1800, 1200));

        let mut state = GameState::new(&DuelConfig::default(), 3, PlayerId::FIRST);
        let spell = state.spawn(PlayerId::FIRST, CardId(1), &catalog.get(CardId(1)).unwrap().kind);
        let knight = state.spawn(PlayerId::SECOND, CardId(2), &catalog.get(CardId(2)).unwrap().kind);
        state
            .relocate(spell, ZoneKind::SpellTrapZone, ZonePosition::Top, Position::FaceUp)
            .unwrap();
        state
            .relocate(knight, ZoneKind::MonsterZone, ZonePosition::Top, Position::FaceUpAttack)
            .unwrap();
        (state, catalog)
    }

    fn link(state: &GameState) -> ChainLink {
        let spell = state.card(InstanceId(0)).unwrap();
        let mut link = ChainLink::new(spell.id, spell.moves, CardId(1), 0, PlayerId::FIRST, SpellSpeed::ONE);
        link.number = 1;
        link
    }

    #[test]
    fn test_resolve_applies_and_discards_spell() {
        let (mut state, catalog) = setup();
        let link = link(&state);
        let outcome = resolve_link(&mut state, &catalog, &link);

        assert_eq!(outcome, EffectOutcome::Applied);
        assert_eq!(state.player(PlayerId::SECOND).life, 7500);
        assert_eq!(state.card(InstanceId(0)).unwrap().zone, ZoneKind::Graveyard);
    }

    #[test]
    fn test_negated_link_does_nothing() {
        let (mut state, catalog) = setup();
        let mut link = link(&state);
        link.negated = true;

        assert_eq!(resolve_link(&mut state, &catalog, &link), EffectOutcome::Negated);
        assert_eq!(state.player(PlayerId::SECOND).life, 8000);
        assert_eq!(state.card(InstanceId(0)).unwrap().zone, ZoneKind::Graveyard);
    }

    #[test]
    fn test_moved_target_aborts_whole_effect() {
        let (state, catalog) = setup();
        let knight = state.card(InstanceId(1)).unwrap();
        let link = link(&state).with_targets([BoundTarget { card: knight.id, moves: knight.moves + 1 }]);
        let ctx = EffectContext { catalog: &catalog, link: &link };

        let root = EffectNode::Sequence(vec![
            EffectNode::action(EffectAction::Damage { amount: 500 }, TargetSelector::Opponent),
            EffectNode::action(EffectAction::Destroy, TargetSelector::Chosen(0)),
        ]);
        let err = execute(&state, &ctx, &root).unwrap_err();
        assert_eq!(err, InvariantViolation::TargetMoved(InstanceId(1)));
        assert_eq!(state.player(PlayerId::SECOND).life, 8000);
    }

    #[test]
    fn test_aborted_link_is_logged() {
        let (mut state, mut catalog) = setup();
        let broken = CardTemplate::new(
            CardId(1),
            "Broken",
            CardKind::Spell(crate::cards::SpellKind::Normal),
        )
        .with_effect(CardEffect::new(
            EffectKind::Activate,
            SpellSpeed::ONE,
            EffectNode::action(EffectAction::Destroy, TargetSelector::AttackTarget),
        ));
        catalog.insert(broken);

        let link = link(&state);
        assert_eq!(resolve_link(&mut state, &catalog, &link), EffectOutcome::Aborted);
        assert!(state
            .log
            .iter()
            .any(|e| matches!(e.event, GameEvent::EffectAborted { number: 1, .. })));
    }

    #[test]
    fn test_resolve_selector_players() {
        let (state, catalog) = setup();
        let link = link(&state);
        let ctx = EffectContext { catalog: &catalog, link: &link };

        let both = resolve_selector(&state, &ctx, &TargetSelector::BothPlayers).unwrap();
        assert_eq!(both.players().unwrap(), &[PlayerId::FIRST, PlayerId::SECOND]);
        assert!(both.cards().is_err());

        let this = resolve_selector(&state, &ctx, &TargetSelector::This).unwrap();
        assert_eq!(this.cards().unwrap().as_slice(), &[InstanceId(0)]);
    }
}
