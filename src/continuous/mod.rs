//! Continuous effects: always-on modifiers, recomputed after every mutation.
//!
//! ## Key Types
//!
//! - `ContinuousAbility`: A template's static ability (filter + effect)
//! - `Modifier`: One active change to one card, with a duration
//! - `ContinuousSnapshot`: Full result of a recompute
//!
//! The tracker never updates incrementally. `refresh` rebuilds everything
//! from the current board and the granted modifiers that are still live.

pub mod modifier;
pub mod tracker;

pub use modifier::{
    ContinuousAbility, Layer, Modifier, ModifierDuration, ModifierKind, StaticEffect,
};
pub use tracker::{expire, recompute, refresh, ContinuousSnapshot};
