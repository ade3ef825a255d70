//! # duel-rules
//!
//! A rules engine for two-player trading card duels: chains with spell
//! speeds, response windows, triggered and continuous effects, summoning,
//! battle, and a JSON effect language for card catalogs.
//!
//! ## Design Principles
//!
//! 1. **Versioned State**: Every accepted action produces a new
//!    [`GameState`] version. Rejections leave the caller's state untouched.
//!
//! 2. **Data-Driven Cards**: Card behavior comes from the catalog's effect
//!    trees, validated up front with every failing node reported.
//!
//! 3. **One Path for Every Caller**: Human clients, scripted opponents, and
//!    timeouts all submit the same [`Action`]s.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) state clones via `im-rs`, so an
//!   action can run on a copy and be thrown away on failure.
//!
//! - **Mutations**: Effects compute a batch of [`effects::Mutation`]s against a
//!   working copy; a failed batch is discarded whole.
//!
//! ## Modules
//!
//! - `core`: Ids, players, configuration, actions, errors, the state
//! - `zones`: Per-player zones
//! - `cards`: Templates, the catalog, and card instances
//! - `effects`: Effect trees, the DSL parser, and the executor
//! - `chain`: Chain links and the priority state machine
//! - `triggers`: Events, trigger collection, response windows
//! - `continuous`: Continuous effects and modifiers
//! - `rules`: The rules engine, combat, summoning, state-based checks
//! - `turn`: Phases and turn transitions
//! - `duel`: The public facade, legal actions, and player views

pub mod core;
pub mod zones;
pub mod cards;
pub mod effects;
pub mod chain;
pub mod triggers;
pub mod continuous;
pub mod rules;
pub mod turn;
pub mod duel;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionError, DuelConfig, GameState, InstanceId, PassRule, PlayerId, PlayerMap,
};

pub use crate::cards::{CardCatalog, CardId, CardInstance, CardKind, CardTemplate, Position};

pub use crate::effects::{CardEffect, EffectKind, ParseError, SpellSpeed};

pub use crate::chain::{Chain, ChainLink};

pub use crate::triggers::{GameEvent, LoggedEvent};

pub use crate::rules::{DuelRules, GameResult, RulesEngine};

pub use crate::turn::Phase;

pub use crate::duel::{Duel, DuelBuilder, DuelView, LegalActionCache, SetupError};
