//! Rejections and invariant failures.
//!
//! ## Taxonomy
//!
//! - **Structural** errors belong to catalog loading (`effects::ParseError`).
//! - **Legality** errors reject an action before anything changes.
//! - **Invariant** violations abort a single effect's mutation batch; the
//!   chain carries on with the next link.
//! - **Terminal** means the duel is over and accepts nothing further.
//!
//! Every `ActionError` carries a stable reason code so callers can branch on
//! it without matching display strings.

use thiserror::Error;

use crate::cards::CardId;
use crate::effects::ActivationLimit;
use crate::turn::Phase;
use crate::zones::ZoneKind;

use super::entity::InstanceId;
use super::player::PlayerId;

/// Recoverability class of a rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The action was illegal in the current state; try another.
    Legality,
    /// The state could not support the request.
    Invariant,
    /// The duel has ended.
    Terminal,
}

/// Why an action was rejected. The game state is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the duel is over")]
    GameOver,
    #[error("{0} does not hold priority")]
    NoPriority(PlayerId),
    #[error("{0} is not the turn player")]
    NotTurnPlayer(PlayerId),
    #[error("{action} is not legal during the {phase} phase")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("a chain or response window is still open")]
    ChainInProgress,
    #[error("there is nothing to respond to")]
    NothingToPass,
    #[error("normal summon already used")]
    NormalSummonUsed,
    #[error("summon requires {required} tribute(s), {provided} given")]
    WrongTributeCount { required: usize, provided: usize },
    #[error("{0} cannot be tributed")]
    InvalidTribute(InstanceId),
    #[error("no free {0} slot")]
    NoFreeZone(ZoneKind),
    #[error("{0} does not exist")]
    UnknownCard(InstanceId),
    #[error("{0} is not in the hand")]
    NotInHand(InstanceId),
    #[error("{0} is not a monster")]
    NotAMonster(InstanceId),
    #[error("{0} is not controlled by the acting player")]
    NotOwner(InstanceId),
    #[error("{card} has no effect #{effect}")]
    UnknownEffect { card: InstanceId, effect: usize },
    #[error("{card} cannot be activated: {reason}")]
    NotActivatable { card: InstanceId, reason: &'static str },
    #[error("spell speed {speed} cannot respond to spell speed {required}")]
    SpellSpeedTooLow { speed: u8, required: u8 },
    #[error("{card} already used its {limit} activation")]
    LimitReached { card: InstanceId, limit: ActivationLimit },
    #[error("the activation condition of {0} is not met")]
    ConditionNotMet(InstanceId),
    #[error("cost cannot be paid: {0}")]
    CannotPayCost(&'static str),
    #[error("invalid targets: {0}")]
    InvalidTargets(&'static str),
    #[error("invalid attack: {0}")]
    InvalidAttack(&'static str),
    #[error("cannot change position: {0}")]
    CannotChangePosition(&'static str),
    #[error("the special summon condition of {0} is not met")]
    SummonConditionNotMet(CardId),
    #[error("nothing to time out for {0}")]
    NothingToTimeOut(PlayerId),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl ActionError {
    /// Stable machine-readable reason code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameOver => "game_over",
            Self::NoPriority(_) => "no_priority",
            Self::NotTurnPlayer(_) => "not_turn_player",
            Self::WrongPhase { .. } => "wrong_phase",
            Self::ChainInProgress => "chain_in_progress",
            Self::NothingToPass => "nothing_to_pass",
            Self::NormalSummonUsed => "normal_summon_used",
            Self::WrongTributeCount { .. } => "wrong_tribute_count",
            Self::InvalidTribute(_) => "invalid_tribute",
            Self::NoFreeZone(_) => "no_free_zone",
            Self::UnknownCard(_) => "unknown_card",
            Self::NotInHand(_) => "not_in_hand",
            Self::NotAMonster(_) => "not_a_monster",
            Self::NotOwner(_) => "not_owner",
            Self::UnknownEffect { .. } => "unknown_effect",
            Self::NotActivatable { .. } => "not_activatable",
            Self::SpellSpeedTooLow { .. } => "spell_speed_too_low",
            Self::LimitReached { .. } => "limit_reached",
            Self::ConditionNotMet(_) => "condition_not_met",
            Self::CannotPayCost(_) => "cannot_pay_cost",
            Self::InvalidTargets(_) => "invalid_targets",
            Self::InvalidAttack(_) => "invalid_attack",
            Self::CannotChangePosition(_) => "cannot_change_position",
            Self::SummonConditionNotMet(_) => "summon_condition_not_met",
            Self::NothingToTimeOut(_) => "nothing_to_time_out",
            Self::Invariant(_) => "invariant_violation",
        }
    }

    /// Recoverability class.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::GameOver => ErrorClass::Terminal,
            Self::Invariant(_) => ErrorClass::Invariant,
            _ => ErrorClass::Legality,
        }
    }

    /// Can the caller retry with a different action?
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.class() != ErrorClass::Terminal
    }
}

/// A mutation could not be applied to the current state.
///
/// Raised while an effect executes; the effect's whole batch is discarded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{0} left its zone after it was targeted")]
    TargetMoved(InstanceId),
    #[error("{0} does not exist")]
    MissingCard(InstanceId),
    #[error("{0} is not on the field")]
    NotOnField(InstanceId),
    #[error("{card} is not in the {zone}")]
    NotInZone { card: InstanceId, zone: ZoneKind },
    #[error("{0} has no cards left to draw")]
    DeckEmpty(PlayerId),
    #[error("{player} needs {needed} card(s) but only has {available}")]
    NotEnoughCards { player: PlayerId, needed: usize, available: usize },
    #[error("{player} has no free {zone} slot")]
    NoFreeZone { player: PlayerId, zone: ZoneKind },
    #[error("{0} is not a monster")]
    NotAMonster(InstanceId),
    #[error("{0} is not in the catalog")]
    UnknownTemplate(CardId),
    #[error("there is no chain link below this one")]
    NoPreviousLink,
    #[error("there is no attack in progress")]
    NoAttack,
    #[error("the selector resolved to the wrong kind of target")]
    WrongTargetKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_summon_reason() {
        let err = ActionError::NormalSummonUsed;
        assert_eq!(err.to_string(), "normal summon already used");
        assert_eq!(err.code(), "normal_summon_used");
        assert_eq!(err.class(), ErrorClass::Legality);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_terminal_class() {
        assert_eq!(ActionError::GameOver.class(), ErrorClass::Terminal);
        assert!(!ActionError::GameOver.is_recoverable());
    }

    #[test]
    fn test_invariant_wraps() {
        let err: ActionError = InvariantViolation::NoAttack.into();
        assert_eq!(err.class(), ErrorClass::Invariant);
        assert_eq!(err.to_string(), "there is no attack in progress");
    }

    #[test]
    fn test_speed_message() {
        let err = ActionError::SpellSpeedTooLow { speed: 1, required: 2 };
        assert_eq!(err.to_string(), "spell speed 1 cannot respond to spell speed 2");
    }
}
