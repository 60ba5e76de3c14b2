//! Flock registration
//!
//! Once per tick every living animal is indexed with a roster entry, then
//! each animal's neighbour list is rebuilt from same-species animals inside
//! its flock radius. The phase only reads the previous tick's state, so the
//! neighbour search runs on rayon once there are enough animals.

use rayon::prelude::*;

use crate::core::types::Species;
use crate::entity::animal::{Animal, RosterEntry};
use crate::spatial::SpatialIndex;
use crate::steering::Neighbor;

/// Radius inside which same-species animals count as flockmates
#[derive(Debug, Clone, Copy)]
pub struct FlockRadii {
    pub deer: f32,
    pub wolf: f32,
}

impl FlockRadii {
    pub fn for_species(&self, species: Species) -> f32 {
        match species {
            Species::Deer => self.deer,
            Species::Wolf => self.wolf,
            Species::Human => 0.0,
        }
    }

    fn max(&self) -> f32 {
        self.deer.max(self.wolf)
    }
}

/// Index every living animal by position
pub fn build_roster(animals: &[Animal], cell_size: f32) -> SpatialIndex<RosterEntry> {
    let mut roster = SpatialIndex::new(cell_size);
    roster.rebuild(
        animals
            .iter()
            .filter(|a| a.alive)
            .map(|a| (a.id, a.position, a.roster_entry())),
    );
    roster
}

/// Snapshots of the flockmates around one animal
pub fn neighbors_of(animal: &Animal, roster: &SpatialIndex<RosterEntry>, radius: f32) -> Vec<Neighbor> {
    roster
        .within(animal.position, radius)
        .filter(|e| e.id != animal.id && e.data.species == animal.species)
        .map(|e| Neighbor {
            position: e.position,
            velocity: e.data.velocity,
            shared_target: e.data.shared_target,
        })
        .collect()
}

/// Rebuild the roster and every animal's neighbour list
pub fn register_flocks(
    animals: &mut [Animal],
    radii: FlockRadii,
    parallel_threshold: usize,
) -> SpatialIndex<RosterEntry> {
    let roster = build_roster(animals, radii.max().max(1.0));

    let lists: Vec<Vec<Neighbor>> = if animals.len() >= parallel_threshold {
        animals
            .par_iter()
            .map(|a| neighbors_of(a, &roster, radii.for_species(a.species)))
            .collect()
    } else {
        animals
            .iter()
            .map(|a| neighbors_of(a, &roster, radii.for_species(a.species)))
            .collect()
    };

    for (animal, neighbors) in animals.iter_mut().zip(lists) {
        animal.neighbors = if animal.alive { neighbors } else { Vec::new() };
    }
    roster
}
