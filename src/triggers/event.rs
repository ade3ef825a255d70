//! Game event types.
//!
//! Events describe what happened during a duel. They serve two consumers:
//! - The append-only event log handed to external persistence and replay
//! - Trigger detection, which matches a subset of events against the
//!   trigger specs of cards on the board
//!
//! Every event is stamped with a sequence number and turn when logged.

use serde::{Deserialize, Serialize};

use crate::cards::Position;
use crate::core::{InstanceId, PlayerId};
use crate::effects::EffectOutcome;
use crate::rules::GameResult;
use crate::turn::Phase;
use crate::zones::ZoneKind;

/// How a monster arrived on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummonKind {
    Normal,
    Tribute,
    Special,
    Flip,
}

/// Something that happened in a duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnStarted { player: PlayerId, turn: u32 },
    PhaseChanged { phase: Phase },
    CardDrawn { player: PlayerId, card: InstanceId },
    Summoned { card: InstanceId, player: PlayerId, kind: SummonKind },
    CardSet { card: InstanceId, player: PlayerId },
    PositionChanged { card: InstanceId, position: Position },
    AttackDeclared { attacker: InstanceId, target: Option<InstanceId> },
    AttackNegated { attacker: InstanceId },
    /// The attack was dropped because a participant left the field.
    AttackCancelled { attacker: InstanceId },
    BattleResolved { attacker: InstanceId, target: Option<InstanceId> },
    Damage { player: PlayerId, amount: u32, by_battle: bool },
    LifeGained { player: PlayerId, amount: u32 },
    LifePaid { player: PlayerId, amount: u32 },
    CardMoved { card: InstanceId, from: ZoneKind, to: ZoneKind },
    Destroyed { card: InstanceId, by_battle: bool },
    DeckShuffled { player: PlayerId },
    EffectActivated { card: InstanceId, effect: usize, player: PlayerId },
    ChainLinkAdded { number: usize, card: InstanceId, speed: u8 },
    ChainLinkResolved { number: usize, card: InstanceId, outcome: EffectOutcome },
    /// A link's mutation batch was discarded.
    EffectAborted { number: usize, card: InstanceId, reason: String },
    ChainResolved { length: usize },
    PriorityPassed { player: PlayerId },
    WindowOpened { holder: PlayerId },
    WindowClosed,
    HandLimitDiscard { player: PlayerId, card: InstanceId },
    GameEnded { result: GameResult },
}

impl GameEvent {
    /// Can this event fire triggers?
    #[must_use]
    pub fn can_trigger(&self) -> bool {
        matches!(
            self,
            Self::Summoned { .. }
                | Self::AttackDeclared { .. }
                | Self::Damage { .. }
                | Self::CardMoved { .. }
                | Self::Destroyed { .. }
        )
    }

    /// The card the event is about, if any.
    #[must_use]
    pub fn subject(&self) -> Option<InstanceId> {
        match self {
            Self::CardDrawn { card, .. }
            | Self::Summoned { card, .. }
            | Self::CardSet { card, .. }
            | Self::PositionChanged { card, .. }
            | Self::CardMoved { card, .. }
            | Self::Destroyed { card, .. }
            | Self::EffectActivated { card, .. }
            | Self::ChainLinkAdded { card, .. }
            | Self::ChainLinkResolved { card, .. }
            | Self::EffectAborted { card, .. }
            | Self::HandLimitDiscard { card, .. } => Some(*card),
            Self::AttackDeclared { attacker, .. }
            | Self::AttackNegated { attacker }
            | Self::AttackCancelled { attacker }
            | Self::BattleResolved { attacker, .. } => Some(*attacker),
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TurnStarted { .. } => "turn_started",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::CardDrawn { .. } => "card_drawn",
            Self::Summoned { .. } => "summoned",
            Self::CardSet { .. } => "card_set",
            Self::PositionChanged { .. } => "position_changed",
            Self::AttackDeclared { .. } => "attack_declared",
            Self::AttackNegated { .. } => "attack_negated",
            Self::AttackCancelled { .. } => "attack_cancelled",
            Self::BattleResolved { .. } => "battle_resolved",
            Self::Damage { .. } => "damage",
            Self::LifeGained { .. } => "life_gained",
            Self::LifePaid { .. } => "life_paid",
            Self::CardMoved { .. } => "card_moved",
            Self::Destroyed { .. } => "destroyed",
            Self::DeckShuffled { .. } => "deck_shuffled",
            Self::EffectActivated { .. } => "effect_activated",
            Self::ChainLinkAdded { .. } => "chain_link_added",
            Self::ChainLinkResolved { .. } => "chain_link_resolved",
            Self::EffectAborted { .. } => "effect_aborted",
            Self::ChainResolved { .. } => "chain_resolved",
            Self::PriorityPassed { .. } => "priority_passed",
            Self::WindowOpened { .. } => "window_opened",
            Self::WindowClosed => "window_closed",
            Self::HandLimitDiscard { .. } => "hand_limit_discard",
            Self::GameEnded { .. } => "game_ended",
        }
    }
}

/// An event as stored in the duel log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at 0.
    pub seq: u64,
    pub turn: u32,
    pub event: GameEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_trigger() {
        let summoned = GameEvent::Summoned {
            card: InstanceId(1),
            player: PlayerId::FIRST,
            kind: SummonKind::Normal,
        };
        assert!(summoned.can_trigger());
        assert!(!GameEvent::WindowClosed.can_trigger());
        assert!(!GameEvent::PhaseChanged { phase: Phase::Main1 }.can_trigger());
    }

    #[test]
    fn test_subject() {
        let attack = GameEvent::AttackDeclared {
            attacker: InstanceId(3),
            target: Some(InstanceId(8)),
        };
        assert_eq!(attack.subject(), Some(InstanceId(3)));
        assert_eq!(
            GameEvent::Damage { player: PlayerId::FIRST, amount: 1, by_battle: false }.subject(),
            None
        );
    }

    #[test]
    fn test_serialization() {
        let event = LoggedEvent {
            seq: 4,
            turn: 2,
            event: GameEvent::CardMoved {
                card: InstanceId(9),
                from: ZoneKind::Hand,
                to: ZoneKind::Graveyard,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: LoggedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
