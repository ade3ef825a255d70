//! Core engine types: instances, players, state, actions, errors, RNG,
//! configuration.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{combinations, Action, CardList};
pub use config::{ConfigError, DuelConfig, PassRule};
pub use entity::InstanceId;
pub use error::{ActionError, ErrorClass, InvariantViolation};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use state::{GameState, PlayerState, SnapshotError};
