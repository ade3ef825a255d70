//! Response windows.
//!
//! A window opens after an action whose events could be answered: it holds
//! those events (so event-gated effects can check them) and the optional
//! triggers still waiting to be used. Both players must pass in turn for the
//! window to close.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{ActionError, GameState, InstanceId, PlayerId};

use super::condition::TriggerSpec;
use super::event::GameEvent;
use super::registry::TriggeredEffect;

/// Result of a pass in a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPass {
    PriorityTo(PlayerId),
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseWindow {
    /// Events this window answers.
    pub events: Vector<GameEvent>,
    /// Optional triggers not yet used or declined.
    pub optional: Vector<TriggeredEffect>,
    pub holder: PlayerId,
    passes: u8,
}

impl ResponseWindow {
    #[must_use]
    pub fn new(events: Vector<GameEvent>, optional: Vector<TriggeredEffect>, holder: PlayerId) -> Self {
        Self { events, optional, holder, passes: 0 }
    }

    #[must_use]
    pub fn passes(&self) -> u8 {
        self.passes
    }

    /// `player` declines to respond.
    pub fn pass(&mut self, player: PlayerId) -> Result<WindowPass, ActionError> {
        if player != self.holder {
            return Err(ActionError::NoPriority(player));
        }
        self.passes += 1;
        if self.passes >= 2 {
            return Ok(WindowPass::Closed);
        }
        self.holder = self.holder.opponent();
        Ok(WindowPass::PriorityTo(self.holder))
    }

    /// The optional trigger of `card`'s effect `effect`, if still offered.
    #[must_use]
    pub fn offers(&self, card: InstanceId, effect: usize) -> Option<&TriggeredEffect> {
        self.optional
            .iter()
            .find(|t| t.source == card && t.effect == effect)
    }

    /// Remove and return an offered trigger.
    pub fn take(&mut self, card: InstanceId, effect: usize) -> Option<TriggeredEffect> {
        let index = self
            .optional
            .iter()
            .position(|t| t.source == card && t.effect == effect)?;
        Some(self.optional.remove(index))
    }

    /// Does any event of this window satisfy `spec`?
    #[must_use]
    pub fn matches_event(
        &self,
        spec: &TriggerSpec,
        state: &GameState,
        source: InstanceId,
        controller: PlayerId,
    ) -> bool {
        self.events
            .iter()
            .any(|e| spec.matches(e, state, source, controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;
    use crate::effects::SpellSpeed;

    fn offered() -> TriggeredEffect {
        TriggeredEffect {
            source: InstanceId(3),
            source_moves: 1,
            card: CardId(9),
            effect: 0,
            controller: PlayerId::SECOND,
            speed: SpellSpeed::ONE,
            optional: true,
        }
    }

    #[test]
    fn test_two_passes_close() {
        let mut window = ResponseWindow::new(Vector::new(), Vector::new(), PlayerId::FIRST);
        assert_eq!(window.pass(PlayerId::FIRST), Ok(WindowPass::PriorityTo(PlayerId::SECOND)));
        assert_eq!(window.pass(PlayerId::FIRST), Err(ActionError::NoPriority(PlayerId::FIRST)));
        assert_eq!(window.pass(PlayerId::SECOND), Ok(WindowPass::Closed));
    }

    #[test]
    fn test_take_offered_trigger() {
        let mut window =
            ResponseWindow::new(Vector::new(), Vector::unit(offered()), PlayerId::FIRST);
        assert!(window.offers(InstanceId(3), 0).is_some());
        assert!(window.offers(InstanceId(3), 1).is_none());
        assert_eq!(window.take(InstanceId(3), 0), Some(offered()));
        assert!(window.offers(InstanceId(3), 0).is_none());
    }
}
