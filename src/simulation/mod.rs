//! Per-tick simulation phases

pub mod flock;
pub mod snapshot;
pub mod tick;
pub mod village;
pub mod wildlife;

pub use snapshot::WorldSnapshot;
pub use tick::{run_simulation_tick, SimulationEvent};
pub use village::{change_job, update_villagers};

