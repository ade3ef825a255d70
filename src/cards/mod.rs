//! Card system: templates, instances, and the catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card templates
//! - `CardTemplate`: Static card data with its parsed effects
//! - `CardInstance`: Runtime card state (zone, position, current stats)
//! - `CardCatalog`: Immutable template lookup, loadable from JSON
//! - `Stat` / `StatLine`: ATK, DEF and level

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod registry;

pub use attributes::{Stat, StatLine};
pub use definition::{CardCategory, CardId, CardKind, CardTemplate, SpellKind, TrapKind};
pub use instance::{CardInstance, DestructionCause, Position};
pub use registry::{CardCatalog, CatalogLoad};
