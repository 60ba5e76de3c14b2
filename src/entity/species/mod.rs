//! Species controllers layered on the group AI

pub mod deer;
pub mod wolf;

pub use deer::{update_deer, DeerState};
pub use wolf::{pursuit_boost, update_wolf, AttackEvent, WolfState};
