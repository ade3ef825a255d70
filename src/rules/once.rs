//! Once-per-turn and once-per-duel activation limits.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{ActionError, InstanceId};
use crate::effects::ActivationLimit;

/// Activation counts for one effect of one card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub card: InstanceId,
    pub effect: usize,
    pub this_turn: u32,
    pub this_duel: u32,
}

/// Tracks how often each effect has been activated.
///
/// Counts are per instance: two copies of the same card have separate limits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationTracker {
    records: Vector<ActivationRecord>,
}

impl ActivationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, card: InstanceId, effect: usize) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.card == card && r.effect == effect)
    }

    #[must_use]
    pub fn record_for(&self, card: InstanceId, effect: usize) -> Option<&ActivationRecord> {
        self.find(card, effect).and_then(|i| self.records.get(i))
    }

    #[must_use]
    pub fn count_this_turn(&self, card: InstanceId, effect: usize) -> u32 {
        self.record_for(card, effect).map_or(0, |r| r.this_turn)
    }

    #[must_use]
    pub fn count_this_duel(&self, card: InstanceId, effect: usize) -> u32 {
        self.record_for(card, effect).map_or(0, |r| r.this_duel)
    }

    /// Would another activation stay within `limit`?
    pub fn check(
        &self,
        card: InstanceId,
        effect: usize,
        limit: Option<ActivationLimit>,
    ) -> Result<(), ActionError> {
        let used = match limit {
            None => return Ok(()),
            Some(ActivationLimit::OncePerTurn) => self.count_this_turn(card, effect),
            Some(ActivationLimit::OncePerDuel) => self.count_this_duel(card, effect),
        };
        match limit {
            Some(limit) if used >= 1 => Err(ActionError::LimitReached { card, limit }),
            _ => Ok(()),
        }
    }

    /// Count one activation.
    pub fn record(&mut self, card: InstanceId, effect: usize) {
        match self.find(card, effect) {
            Some(index) => {
                if let Some(record) = self.records.get_mut(index) {
                    record.this_turn += 1;
                    record.this_duel += 1;
                }
            }
            None => self.records.push_back(ActivationRecord {
                card,
                effect,
                this_turn: 1,
                this_duel: 1,
            }),
        }
    }

    /// Clear per-turn counts. Duel counts are kept.
    pub fn reset_turn(&mut self) {
        for record in self.records.iter_mut() {
            record.this_turn = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_effect() {
        let mut tracker = ActivationTracker::new();
        tracker.record(InstanceId(1), 0);
        tracker.record(InstanceId(1), 0);
        assert!(tracker.check(InstanceId(1), 0, None).is_ok());
        assert_eq!(tracker.count_this_turn(InstanceId(1), 0), 2);
    }

    #[test]
    fn test_once_per_turn() {
        let mut tracker = ActivationTracker::new();
        let limit = Some(ActivationLimit::OncePerTurn);
        assert!(tracker.check(InstanceId(1), 0, limit).is_ok());

        tracker.record(InstanceId(1), 0);
        assert_eq!(
            tracker.check(InstanceId(1), 0, limit),
            Err(ActionError::LimitReached {
                card: InstanceId(1),
                limit: ActivationLimit::OncePerTurn
            })
        );

        // Other effects and other copies are independent.
        assert!(tracker.check(InstanceId(1), 1, limit).is_ok());
        assert!(tracker.check(InstanceId(2), 0, limit).is_ok());

        tracker.reset_turn();
        assert!(tracker.check(InstanceId(1), 0, limit).is_ok());
        assert_eq!(tracker.count_this_turn(InstanceId(1), 0), 0);
    }

    #[test]
    fn test_once_per_duel_survives_reset() {
        let mut tracker = ActivationTracker::new();
        let limit = Some(ActivationLimit::OncePerDuel);
        tracker.record(InstanceId(4), 2);
        tracker.reset_turn();
        assert!(tracker.check(InstanceId(4), 2, limit).is_err());
        assert_eq!(tracker.count_this_duel(InstanceId(4), 2), 1);
    }
}
