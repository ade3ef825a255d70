//! Chain state machine.
//!
//! Links are pushed onto a stack and resolve in LIFO order. After every
//! activation the other player receives priority; once both players have
//! passed back-to-back the chain drains from the top.
//!
//! ## States
//!
//! - `Idle`: no links
//! - `AwaitingResponse`: at least one link, one player holds priority
//! - `Resolving`: links are being popped and executed
//!
//! This type only tracks ordering and priority. Executing a popped link is
//! the duel flow's job, so the chain stays independent of effect semantics.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ActionError, PassRule, PlayerId};
use crate::effects::SpellSpeed;

use super::link::ChainLink;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainStatus {
    Idle,
    AwaitingResponse,
    Resolving,
}

/// What a pass led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to this player.
    PriorityTo(PlayerId),
    /// Both players are done; the chain must resolve now.
    Resolve,
}

/// The chain of activations.
///
/// ## Example
///
/// ```
/// use duel_rules::chain::{Chain, ChainLink, ChainStatus, PassOutcome};
/// use duel_rules::cards::CardId;
/// use duel_rules::core::{InstanceId, PassRule, PlayerId};
/// use duel_rules::effects::SpellSpeed;
///
/// let mut chain = Chain::new(PlayerId::FIRST);
/// let link = ChainLink::new(InstanceId(0), 1, CardId(1), 0, PlayerId::FIRST, SpellSpeed::ONE);
/// chain.push(link).unwrap();
///
/// assert_eq!(chain.status(), ChainStatus::AwaitingResponse);
/// assert_eq!(chain.priority(), PlayerId::SECOND);
///
/// assert_eq!(
///     chain.pass(PlayerId::SECOND, PassRule::Consecutive).unwrap(),
///     PassOutcome::PriorityTo(PlayerId::FIRST)
/// );
/// assert_eq!(chain.pass(PlayerId::FIRST, PassRule::Consecutive).unwrap(), PassOutcome::Resolve);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Index 0 is CL1 (bottom).
    links: Vec<ChainLink>,
    status: ChainStatus,
    priority: PlayerId,
    /// Passes since the last activation.
    passes: u8,
}

impl Chain {
    /// An empty chain. `priority` is reported while idle.
    #[must_use]
    pub fn new(priority: PlayerId) -> Self {
        Self {
            links: Vec::new(),
            status: ChainStatus::Idle,
            priority,
            passes: 0,
        }
    }

    #[must_use]
    pub fn status(&self) -> ChainStatus {
        self.status
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Links bottom to top.
    #[must_use]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    #[must_use]
    pub fn top(&self) -> Option<&ChainLink> {
        self.links.last()
    }

    /// Get a link by its 1-based number.
    #[must_use]
    pub fn link(&self, number: usize) -> Option<&ChainLink> {
        number.checked_sub(1).and_then(|i| self.links.get(i))
    }

    /// Player holding priority.
    #[must_use]
    pub fn priority(&self) -> PlayerId {
        self.priority
    }

    /// Can an effect of `speed` be added now?
    pub fn can_activate(&self, speed: SpellSpeed) -> Result<(), ActionError> {
        if self.status == ChainStatus::Resolving {
            return Err(ActionError::ChainInProgress);
        }
        match self.top() {
            Some(top) if speed < top.speed => Err(ActionError::SpellSpeedTooLow {
                speed: speed.value(),
                required: top.speed.value(),
            }),
            _ => Ok(()),
        }
    }

    /// Add a link on top. Priority goes to the other player.
    ///
    /// Returns the link's number.
    pub fn push(&mut self, mut link: ChainLink) -> Result<usize, ActionError> {
        self.can_activate(link.speed)?;

        link.number = self.links.len() + 1;
        let number = link.number;
        self.priority = link.controller.opponent();
        self.passes = 0;
        self.status = ChainStatus::AwaitingResponse;

        debug!(number, source = %link.source, speed = link.speed.value(), "chain link added");
        self.links.push(link);
        Ok(number)
    }

    /// The priority holder declines to respond.
    pub fn pass(&mut self, player: PlayerId, rule: PassRule) -> Result<PassOutcome, ActionError> {
        if self.status != ChainStatus::AwaitingResponse {
            return Err(ActionError::NothingToPass);
        }
        if player != self.priority {
            return Err(ActionError::NoPriority(player));
        }

        self.passes += 1;
        let done = match rule {
            PassRule::Consecutive => self.passes >= 2,
            PassRule::SingleFlip => true,
        };

        if done {
            self.status = ChainStatus::Resolving;
            Ok(PassOutcome::Resolve)
        } else {
            self.priority = player.opponent();
            Ok(PassOutcome::PriorityTo(self.priority))
        }
    }

    /// Enter `Resolving` without passes (used when a chain must drain).
    pub fn begin_resolving(&mut self) {
        if !self.links.is_empty() {
            self.status = ChainStatus::Resolving;
        }
    }

    /// Remove the top link for resolution.
    pub fn pop(&mut self) -> Option<ChainLink> {
        self.links.pop()
    }

    /// Return to idle once drained; priority goes back to the turn player.
    pub fn finish(&mut self, turn_player: PlayerId) {
        self.links.clear();
        self.status = ChainStatus::Idle;
        self.priority = turn_player;
        self.passes = 0;
    }

    /// Mark a link as negated. Returns `false` if there is no such link.
    pub fn negate(&mut self, number: usize) -> bool {
        match number.checked_sub(1).and_then(|i| self.links.get_mut(i)) {
            Some(link) => {
                link.negated = true;
                true
            }
            None => false,
        }
    }
}
