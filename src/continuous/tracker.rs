//! Continuous effect recompute.
//!
//! `recompute` derives the complete modifier set and every card's current
//! stats from the board alone: base stats, live granted modifiers, and the
//! continuous abilities of face-up sources. Nothing from a previous recompute
//! is read back, so running it twice on the same board gives the same answer.
//!
//! Filters and conditions of continuous abilities see the granted-only board:
//! base stats plus granted modifiers, with granted negations. A static boost
//! never changes which cards a static filter selects.
//!
//! ## Layers
//!
//! 1. Negation: granted negations, then static negations from sources that
//!    are not themselves negated by a granted modifier
//! 2. Numeric: stat deltas, summed in order
//! 3. Override: stat replacements, last one wins
//!
//! Continuous abilities of negated sources contribute nothing. Granted
//! modifiers come from effects that already resolved and stay regardless.

use im::Vector;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::cards::{CardCatalog, CardInstance, StatLine};
use crate::core::{GameState, InstanceId};

use super::modifier::{Layer, Modifier, ModifierDuration, ModifierKind};

/// Result of a recompute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinuousSnapshot {
    /// Active modifiers, ordered by layer.
    pub modifiers: Vec<Modifier>,
    /// Current stats, indexed by instance id.
    pub stats: Vec<StatLine>,
    /// Negation flags, indexed by instance id.
    pub negated: Vec<bool>,
}

/// Is a granted modifier still attached to the object it was granted to?
fn is_live(modifier: &Modifier, state: &GameState) -> bool {
    state.card(modifier.target).is_some_and(|card| {
        card.is_on_field() && card.moves == modifier.target_moves
    })
}

/// Static modifiers of `source`, in filter-match order.
fn static_modifiers(
    source: &CardInstance,
    state: &GameState,
    catalog: &CardCatalog,
    out: &mut Vec<Modifier>,
) {
    let Some(template) = catalog.get(source.card) else {
        return;
    };
    for ability in &template.continuous {
        if let Some(condition) = &ability.condition {
            if !condition.holds(state, source.owner, source.id) {
                continue;
            }
        }
        for target in state.cards.iter().filter(|c| ability.affects.matches(c, source.owner, source.id)) {
            out.push(Modifier::new(
                source.id,
                target.id,
                ability.effect.modifier_kind(),
                ModifierDuration::WhileSourceActive,
                target.moves,
            ));
        }
    }
}

/// Apply the numeric and override layers of `modifiers` to base stats.
fn layered_stats<'a>(
    state: &GameState,
    modifiers: impl Iterator<Item = &'a Modifier> + Clone,
) -> Vec<StatLine> {
    let mut stats: Vec<StatLine> = state.cards.iter().map(|c| c.base).collect();
    for layer in [Layer::Numeric, Layer::Override] {
        for modifier in modifiers.clone().filter(|m| m.layer() == layer) {
            let Some(line) = stats.get_mut(modifier.target.index()) else {
                continue;
            };
            match modifier.kind {
                ModifierKind::Delta { stat, amount } => line.apply_delta(stat, amount),
                ModifierKind::Override { stat, value } => line.set(stat, value),
                ModifierKind::Negate => {}
            }
        }
    }
    stats
}

/// Compute the modifier set and current stats for the board.
#[must_use]
pub fn recompute(state: &GameState, catalog: &CardCatalog) -> ContinuousSnapshot {
    let granted: Vec<&Modifier> = state.granted.iter().filter(|m| is_live(m, state)).collect();

    // Layer 1: negation.
    let mut negated: FxHashSet<InstanceId> = granted
        .iter()
        .filter(|m| m.kind == ModifierKind::Negate)
        .map(|m| m.target)
        .collect();

    // Static filters read this board, never the previous recompute's output.
    let mut board = state.clone();
    let granted_stats = layered_stats(state, granted.iter().copied());
    for (card, stats) in board.cards.iter_mut().zip(granted_stats) {
        card.current = stats;
        card.negated = negated.contains(&card.id);
    }

    let mut statics = Vec::new();
    for source in board
        .cards
        .iter()
        .filter(|c| c.is_face_up_on_field() && !negated.contains(&c.id))
    {
        static_modifiers(source, &board, catalog, &mut statics);
    }
    let static_negations: Vec<InstanceId> = statics
        .iter()
        .filter(|m| m.kind == ModifierKind::Negate)
        .map(|m| m.target)
        .collect();
    negated.extend(static_negations);

    // Static numeric and override modifiers of newly negated sources drop out.
    statics.retain(|m| m.kind == ModifierKind::Negate || !negated.contains(&m.source));

    let mut modifiers: Vec<Modifier> = granted.into_iter().cloned().chain(statics).collect();
    modifiers.sort_by_key(Modifier::layer);

    // Layers 2 and 3: stats.
    let stats = layered_stats(state, modifiers.iter());
    let negated_flags = state.cards.iter().map(|c| negated.contains(&c.id)).collect();

    ContinuousSnapshot {
        modifiers,
        stats,
        negated: negated_flags,
    }
}

/// Recompute and write the result into the state.
///
/// Also drops granted modifiers whose target has left the field. Returns
/// whether any card's stats or negation changed.
pub fn refresh(state: &mut GameState, catalog: &CardCatalog) -> bool {
    let snapshot = recompute(state, catalog);

    let live: Vector<Modifier> = state
        .granted
        .iter()
        .filter(|m| is_live(m, state))
        .cloned()
        .collect();
    state.granted = live;

    let mut changed = false;
    for (index, card) in state.cards.iter_mut().enumerate() {
        let stats = snapshot.stats[index];
        let negated = snapshot.negated[index];
        if card.current != stats || card.negated != negated {
            changed = true;
            card.current = stats;
            card.negated = negated;
        }
    }
    state.active = snapshot.modifiers.into_iter().collect();

    if changed {
        trace!(active = state.active.len(), "continuous effects recomputed");
    }
    changed
}

/// Drop granted modifiers with the given duration.
pub fn expire(state: &mut GameState, duration: ModifierDuration) {
    state.granted.retain(|m| m.duration != duration);
}
