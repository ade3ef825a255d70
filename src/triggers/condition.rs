//! Trigger conditions.
//!
//! A `TriggerSpec` names the event that fires a trigger effect (or that an
//! event-gated activation answers), whose card or player it must concern,
//! and whether the controller may decline it.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, InstanceId, PlayerId};
use crate::effects::Side;
use crate::zones::ZoneKind;

use super::event::{GameEvent, SummonKind};

/// Event classes a trigger can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// Any summon, including flip summons.
    Summoned,
    SpecialSummoned,
    FlipSummoned,
    /// Destroyed by battle or by an effect.
    Destroyed,
    DestroyedByBattle,
    /// Arrived in the graveyard for any reason.
    SentToGraveyard,
    AttackDeclared,
    DamageTaken,
}

impl TriggerEvent {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "summoned" => Self::Summoned,
            "special_summoned" => Self::SpecialSummoned,
            "flip_summoned" => Self::FlipSummoned,
            "destroyed" => Self::Destroyed,
            "destroyed_by_battle" => Self::DestroyedByBattle,
            "sent_to_graveyard" => Self::SentToGraveyard,
            "attack_declared" => Self::AttackDeclared,
            "damage_taken" => Self::DamageTaken,
            _ => return None,
        })
    }
}

/// Which card the event must be about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    /// The card carrying the trigger.
    This,
    #[default]
    Any,
}

/// When a trigger fires.
///
/// ```
/// use duel_rules::triggers::{TriggerEvent, TriggerSpec};
///
/// let spec = TriggerSpec::new(TriggerEvent::Destroyed).on_self().optional();
/// assert!(spec.optional);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub event: TriggerEvent,
    pub subject: Subject,
    /// Whose card (or which player, for damage) relative to the controller.
    pub side: Side,
    pub optional: bool,
}

impl TriggerSpec {
    /// Mandatory trigger on any card of either side.
    #[must_use]
    pub fn new(event: TriggerEvent) -> Self {
        Self {
            event,
            subject: Subject::Any,
            side: Side::Either,
            optional: false,
        }
    }

    #[must_use]
    pub fn on_self(mut self) -> Self {
        self.subject = Subject::This;
        self
    }

    #[must_use]
    pub fn on_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Does `event` fire this spec for the card `source` controlled by
    /// `controller`?
    #[must_use]
    pub fn matches(
        &self,
        event: &GameEvent,
        state: &GameState,
        source: InstanceId,
        controller: PlayerId,
    ) -> bool {
        let kind_matches = match (self.event, event) {
            (TriggerEvent::Summoned, GameEvent::Summoned { .. }) => true,
            (TriggerEvent::SpecialSummoned, GameEvent::Summoned { kind, .. }) => {
                *kind == SummonKind::Special
            }
            (TriggerEvent::FlipSummoned, GameEvent::Summoned { kind, .. }) => {
                *kind == SummonKind::Flip
            }
            (TriggerEvent::Destroyed, GameEvent::Destroyed { .. }) => true,
            (TriggerEvent::DestroyedByBattle, GameEvent::Destroyed { by_battle, .. }) => *by_battle,
            (TriggerEvent::SentToGraveyard, GameEvent::CardMoved { to, .. }) => {
                *to == ZoneKind::Graveyard
            }
            (TriggerEvent::AttackDeclared, GameEvent::AttackDeclared { .. }) => true,
            (TriggerEvent::DamageTaken, GameEvent::Damage { .. }) => true,
            _ => false,
        };
        if !kind_matches {
            return false;
        }

        let side = self.side;

        if let GameEvent::Damage { player, .. } = event {
            return self.subject == Subject::Any && side.includes(controller, *player);
        }

        let Some(subject) = event.subject() else {
            return false;
        };
        if self.subject == Subject::This && subject != source {
            return false;
        }
        state
            .card(subject)
            .is_some_and(|card| side.includes(controller, card.owner))
    }
}
