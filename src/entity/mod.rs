//! Living things: wildlife with group AI, and villagers with jobs

pub mod animal;
pub mod species;
pub mod villager;
pub mod vitals;

pub use animal::{Animal, AnimalState, RosterEntry};
pub use villager::Villager;
pub use vitals::{Health, Stamina};
