//! Trigger collection.
//!
//! After an action settles, the events it produced are matched against
//! every card that could react. The result is an ordered list of
//! [`TriggeredEffect`]s: mandatory ones go on the chain at once, optional
//! ones are offered in the response window.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardId};
use crate::core::{GameState, InstanceId, PlayerId};
use crate::effects::{EffectKind, SpellSpeed};
use crate::zones::ZoneKind;

use super::condition::Subject;
use super::event::GameEvent;

/// A trigger effect whose event happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggeredEffect {
    pub source: InstanceId,
    /// Incarnation of the source when the event fired.
    pub source_moves: u32,
    pub card: CardId,
    /// Index into the template's effects.
    pub effect: usize,
    pub controller: PlayerId,
    pub speed: SpellSpeed,
    pub optional: bool,
}

/// Find every trigger effect fired by `events`.
///
/// Order: lower spell speed first, then the turn player's triggers, then
/// instance id and effect index. A trigger fires once per batch no matter
/// how many events match it.
#[must_use]
pub fn collect_triggers(
    state: &GameState,
    catalog: &CardCatalog,
    events: &[GameEvent],
) -> Vec<TriggeredEffect> {
    let mut seen = FxHashSet::default();
    let mut found = Vec::new();

    for card in state.cards.iter() {
        let Some(template) = catalog.get(card.card) else {
            continue;
        };
        let controller = card.owner;

        for (index, effect) in template.effects.iter().enumerate() {
            if effect.kind != EffectKind::Trigger {
                continue;
            }
            let Some(spec) = &effect.trigger else {
                continue;
            };

            let eligible = match spec.subject {
                Subject::This => !matches!(card.zone, ZoneKind::Deck | ZoneKind::Hand),
                Subject::Any => card.is_face_up_on_field(),
            };
            if !eligible || card.negated {
                continue;
            }
            if state.activations.check(card.id, index, effect.limit).is_err() {
                continue;
            }
            if !effect
                .condition
                .as_ref()
                .map_or(true, |c| c.holds(state, controller, card.id))
            {
                continue;
            }
            if !events.iter().any(|e| spec.matches(e, state, card.id, controller)) {
                continue;
            }
            if !seen.insert((card.id, index)) {
                continue;
            }

            found.push(TriggeredEffect {
                source: card.id,
                source_moves: card.moves,
                card: card.card,
                effect: index,
                controller,
                speed: effect.speed,
                optional: spec.optional,
            });
        }
    }

    let turn_player = state.turn_player;
    found.sort_by_key(|t| (t.speed, t.controller != turn_player, t.source, t.effect));
    found
}
