//! Rules: the engine trait and the rule checks the duel flow builds on.
//!
//! ## Key Types
//!
//! - `RulesEngine`: Legal actions, state transitions, terminal check
//! - `DuelRules`: The rule set bound to a catalog and configuration
//! - `ActivationTracker`: Once-per-turn and once-per-duel counts
//! - `PendingAttack`: A declared attack awaiting damage calculation

pub mod combat;
pub mod engine;
pub mod once;
pub mod state_based;
pub mod summon;

pub use combat::{BattleOutcome, PendingAttack};
pub use engine::{DuelRules, GameResult, RulesEngine};
pub use once::{ActivationRecord, ActivationTracker};
pub use summon::SummonPlan;
