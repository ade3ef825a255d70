//! Turn phases.

use serde::{Deserialize, Serialize};

/// Phases of a turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Draw,
    Standby,
    Main1,
    Battle,
    Main2,
    End,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Draw,
        Phase::Standby,
        Phase::Main1,
        Phase::Battle,
        Phase::Main2,
        Phase::End,
    ];

    /// The following phase; `End` wraps to the next turn's `Draw`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Draw => Self::Standby,
            Self::Standby => Self::Main1,
            Self::Main1 => Self::Battle,
            Self::Battle => Self::Main2,
            Self::Main2 => Self::End,
            Self::End => Self::Draw,
        }
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Self::Main1 | Self::Main2)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Standby => "standby",
            Self::Main1 => "main1",
            Self::Battle => "battle",
            Self::Main2 => "main2",
            Self::End => "end",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle() {
        let mut phase = Phase::Draw;
        for expected in &Phase::ALL[1..] {
            phase = phase.next();
            assert_eq!(phase, *expected);
        }
        assert_eq!(phase.next(), Phase::Draw);
    }

    #[test]
    fn test_phase_names() {
        for phase in Phase::ALL {
            assert_eq!(Phase::parse(phase.name()), Some(phase));
        }
        assert!(Phase::Main2.is_main());
        assert!(!Phase::Battle.is_main());
        assert_eq!(Phase::parse("upkeep"), None);
    }
}
