//! Card effects: the effect language, its parser, and its executor.
//!
//! A card's behavior is data. Catalog JSON is compiled once by [`parser`]
//! into typed [`EffectNode`] trees; resolution walks a tree, plans each
//! action as a list of [`Mutation`]s and applies them to a working copy of
//! the state. An effect that fails partway leaves the real state untouched.
//!
//! ## Sections
//!
//! - [`effect`]: Effect kinds, speeds, costs and the action vocabulary
//! - [`targeting`]: Filters and selectors
//! - [`condition`]: Declarative conditions
//! - [`parser`]: JSON to effect trees, with path-carrying validation errors
//! - [`executor`]: Resolving a chain link
//! - `handlers`: One planner per action category
//! - [`mutation`]: Primitive state changes

pub mod condition;
pub mod effect;
pub mod executor;
mod handlers;
pub mod mutation;
pub mod parser;
pub mod targeting;

pub use condition::Condition;
pub use effect::{
    ActivationLimit, CardEffect, Cost, CostResource, DeckPlacement, EffectAction, EffectCategory,
    EffectKind, EffectNode, SpellSpeed, SummonPosition,
};
pub use executor::{execute, resolve_link, resolve_selector, EffectContext, EffectOutcome, Resolved};
pub use mutation::{apply_all, Mutation};
pub use parser::{CatalogError, ParseError, ParseErrorKind};
pub use targeting::{CardFilter, Side, TargetSelector, TargetSpec, ZoneScope};
