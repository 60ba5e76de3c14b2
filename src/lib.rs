//! Ember Hollow - village ecology simulation
//!
//! Flocking wildlife (deer herds fleeing wolf packs) shares a procedurally
//! laid out field with villagers whose jobs gather, build, farm and craft.

pub mod city;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod jobs;
pub mod simulation;
pub mod spatial;
pub mod steering;
pub mod world;
