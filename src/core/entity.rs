//! Card instance identification.
//!
//! Every physical card in a duel gets a unique `InstanceId` when the duel is
//! set up. Ids are dense indices into the state's card table and are never
//! reused, so an id stays valid for the whole duel even after the card has
//! been banished.
//!
//! ```
//! use duel_rules::core::InstanceId;
//!
//! let id = InstanceId::new(7);
//! assert_eq!(id.index(), 7);
//! assert_eq!(format!("{}", id), "Instance(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance within one duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Create a new instance ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Index into the card table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_and_raw() {
        let id = InstanceId::new(12);
        assert_eq!(id.index(), 12);
        assert_eq!(id.raw(), 12);
        assert_eq!(InstanceId::from(12), id);
    }

    #[test]
    fn test_ordering() {
        assert!(InstanceId(1) < InstanceId(2));
    }

    #[test]
    fn test_serialization() {
        let id = InstanceId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: InstanceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
