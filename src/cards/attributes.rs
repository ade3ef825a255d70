//! Monster stats.
//!
//! Three numeric attributes exist: ATK, DEF and level. Effects address them
//! by name (`"atk"`, `"def"`, `"level"`); anything else is rejected when the
//! catalog loads.

use serde::{Deserialize, Serialize};

/// A modifiable monster attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    Atk,
    Def,
    Level,
}

impl Stat {
    /// Name used by the effect language.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Atk => "atk",
            Self::Def => "def",
            Self::Level => "level",
        }
    }

    /// Parse an attribute name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "atk" => Some(Self::Atk),
            "def" => Some(Self::Def),
            "level" => Some(Self::Level),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// ATK, DEF and level of a card at one point in time.
///
/// ```
/// use duel_rules::cards::{Stat, StatLine};
///
/// let mut line = StatLine::new(1800, 1200, 4);
/// line.apply_delta(Stat::Atk, -2000);
/// assert_eq!(line.atk, 0);
/// line.set(Stat::Def, 500);
/// assert_eq!(line.get(Stat::Def), 500);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatLine {
    pub atk: u32,
    pub def: u32,
    pub level: u32,
}

impl StatLine {
    #[must_use]
    pub const fn new(atk: u32, def: u32, level: u32) -> Self {
        Self { atk, def, level }
    }

    #[must_use]
    pub const fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Level => self.level,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        match stat {
            Stat::Atk => self.atk = value,
            Stat::Def => self.def = value,
            Stat::Level => self.level = value,
        }
    }

    /// Add a signed delta, flooring at zero.
    pub fn apply_delta(&mut self, stat: Stat, delta: i32) {
        let value = i64::from(self.get(stat)) + i64::from(delta);
        let clamped = value.clamp(0, i64::from(u32::MAX));
        self.set(stat, u32::try_from(clamped).unwrap_or(u32::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_names() {
        for stat in [Stat::Atk, Stat::Def, Stat::Level] {
            assert_eq!(Stat::parse(stat.name()), Some(stat));
        }
        assert_eq!(Stat::parse("hp"), None);
        assert_eq!(format!("{}", Stat::Def), "def");
    }

    #[test]
    fn test_delta_floors_at_zero() {
        let mut line = StatLine::new(1000, 1000, 4);
        line.apply_delta(Stat::Atk, -1500);
        line.apply_delta(Stat::Def, 300);
        line.apply_delta(Stat::Level, -1);

        assert_eq!(line, StatLine::new(0, 1300, 3));
    }
}
