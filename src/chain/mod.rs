//! Chain resolution with spell-speed priority.
//!
//! ## Key Types
//!
//! - `ChainLink`: One activation with its captured targets
//! - `Chain`: The link stack, its status and priority tracking
//! - `PassOutcome`: Whether a pass flipped priority or starts resolution

pub mod link;
pub mod resolver;

pub use link::{BoundTarget, ChainLink};
pub use resolver::{Chain, ChainStatus, PassOutcome};
