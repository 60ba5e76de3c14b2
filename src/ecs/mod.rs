//! World storage

pub mod world;

pub use world::World;
