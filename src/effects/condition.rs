//! Board conditions.
//!
//! Conditions gate activations (`"condition"`), branch effect trees
//! (`{"if": ...}`), gate continuous abilities, and describe special summon
//! requirements. They are evaluated against the current state from the
//! point of view of the effect's controller.

use crate::core::{GameState, InstanceId, PlayerId};
use crate::turn::Phase;

use super::targeting::{CardFilter, Side};

/// A predicate over the game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Always,
    /// Some player on `side` has at most `amount` life points.
    LifeAtMost { side: Side, amount: u32 },
    /// Some player on `side` has at least `amount` life points.
    LifeAtLeast { side: Side, amount: u32 },
    /// Some player on `side` holds at least `count` cards.
    HandAtLeast { side: Side, count: usize },
    /// Number of cards matching the filter is within bounds.
    Count {
        filter: CardFilter,
        at_least: Option<usize>,
        at_most: Option<usize>,
    },
    /// The current phase.
    Phase(Phase),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// "You control no monsters".
    #[must_use]
    pub fn no_monsters(side: Side) -> Self {
        Self::Count {
            filter: CardFilter::field_monsters(side),
            at_least: None,
            at_most: Some(0),
        }
    }

    /// Evaluate for an effect of `source` controlled by `controller`.
    #[must_use]
    pub fn holds(&self, state: &GameState, controller: PlayerId, source: InstanceId) -> bool {
        match self {
            Self::Always => true,
            Self::LifeAtMost { side, amount } => side
                .players(controller)
                .into_iter()
                .any(|p| state.player(p).life <= *amount),
            Self::LifeAtLeast { side, amount } => side
                .players(controller)
                .into_iter()
                .any(|p| state.player(p).life >= *amount),
            Self::HandAtLeast { side, count } => side
                .players(controller)
                .into_iter()
                .any(|p| state.player(p).zones.hand.len() >= *count),
            Self::Count { filter, at_least, at_most } => {
                let n = state
                    .cards
                    .iter()
                    .filter(|c| filter.matches(c, controller, source))
                    .count();
                at_least.map_or(true, |min| n >= min) && at_most.map_or(true, |max| n <= max)
            }
            Self::Phase(phase) => state.phase == *phase,
            Self::All(conditions) => conditions.iter().all(|c| c.holds(state, controller, source)),
            Self::Any(conditions) => conditions.iter().any(|c| c.holds(state, controller, source)),
            Self::Not(inner) => !inner.holds(state, controller, source),
        }
    }
}
