//! Turn structure: phases and the transitions between them.
//!
//! ## Phases
//!
//! Draw → Standby → Main 1 → Battle → Main 2 → End, then the other player's
//! Draw. Battle may be skipped by ending the turn from Main 1.

pub mod manager;
pub mod phase;

pub use manager::{
    discard_to_hand_limit, end_turn, enter_battle_phase, enter_main_phase_2, set_phase, start_turn,
};
pub use phase::Phase;
