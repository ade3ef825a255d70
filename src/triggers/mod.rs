//! Events and the effects they trigger.
//!
//! Every state change is recorded as a [`GameEvent`]. Trigger-capable
//! events queue up until the current action settles; then
//! [`collect_triggers`] matches them against the board. Mandatory triggers
//! go straight onto the chain, optional ones wait in a [`ResponseWindow`]
//! together with the events, where event-gated quick effects can also
//! answer them.
//!
//! ## Example
//!
//! ```
//! use duel_rules::core::{InstanceId, PlayerId};
//! use duel_rules::triggers::{GameEvent, TriggerEvent, TriggerSpec};
//!
//! let spec = TriggerSpec::new(TriggerEvent::Destroyed).on_self().optional();
//! assert!(spec.optional);
//!
//! let event = GameEvent::Destroyed { card: InstanceId(4), by_battle: true };
//! assert!(event.can_trigger());
//! assert_eq!(event.subject(), Some(InstanceId(4)));
//! # let _ = PlayerId::FIRST;
//! ```

mod condition;
mod event;
mod registry;
mod window;

pub use condition::{Subject, TriggerEvent, TriggerSpec};
pub use event::{GameEvent, LoggedEvent, SummonKind};
pub use registry::{collect_triggers, TriggeredEffect};
pub use window::{ResponseWindow, WindowPass};
