pub mod grid;
pub mod sparse_hash;

pub use grid::Grid;
pub use sparse_hash::{IndexedEntry, SpatialIndex};
