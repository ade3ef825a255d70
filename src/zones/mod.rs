//! Zone system for card locations.
//!
//! Each player owns a deck, a hand, two fixed-size field rows (monsters and
//! spells/traps), a graveyard and a banished pile.
//!
//! ## Key Types
//!
//! - `ZoneKind`: Which location a card is in
//! - `PlayerZones`: Membership and ordering for one player's zones
//! - `ZonePosition`: Top or bottom placement in ordered piles

pub mod manager;

pub use manager::{PlayerZones, ZoneKind, ZonePosition};
