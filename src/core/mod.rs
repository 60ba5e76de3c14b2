pub mod calendar;
pub mod config;
pub mod error;
pub mod math;
pub mod rng;
pub mod types;

pub use calendar::{DayPhase, GameClock};
