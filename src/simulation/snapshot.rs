//! Serialisable debug view of the world
//!
//! Captured on demand from the headless binary and written as JSON; it is
//! the only thing a renderer or debugger needs to read.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::city::{FacilityType, ItemType, RequestId, RequestState};
use crate::core::calendar::DayPhase;
use crate::core::error::Result;
use crate::core::types::{EntityId, Species, Tick};
use crate::ecs::world::World;
use crate::jobs::JobKind;
use crate::world::{CollectibleKind, TerrainType, Territory};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub id: EntityId,
    pub species: Species,
    pub position: Vec3,
    pub velocity: Vec3,
    pub stamina: f32,
    pub health: f32,
    pub shared_target: Option<Vec3>,
    pub neighbors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VillagerSnapshot {
    pub id: EntityId,
    pub name: String,
    pub job: JobKind,
    pub state: String,
    pub position: Vec3,
    pub stamina: f32,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySnapshot {
    pub id: EntityId,
    pub facility_type: FacilityType,
    pub level: u32,
    pub position: Vec3,
    pub users: usize,
    pub capacity: usize,
    pub open_orders: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequestSnapshot {
    pub id: RequestId,
    pub facility_type: FacilityType,
    pub upgrade: Option<EntityId>,
    pub state: RequestState,
    pub progress: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub seed: u64,
    pub tick: Tick,
    pub day: u64,
    pub phase: DayPhase,
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` cells
    pub terrain: Vec<TerrainType>,
    pub territory: Vec<Territory>,
    pub animals: Vec<AnimalSnapshot>,
    pub villagers: Vec<VillagerSnapshot>,
    pub facilities: Vec<FacilitySnapshot>,
    pub stock: Vec<(ItemType, u32)>,
    pub collectibles: Vec<(CollectibleKind, usize)>,
    pub build_requests: Vec<BuildRequestSnapshot>,
    pub pending_generation: usize,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        let animals = world
            .animals
            .iter()
            .map(|a| AnimalSnapshot {
                id: a.id,
                species: a.species,
                position: a.position,
                velocity: a.velocity,
                stamina: a.stamina.current,
                health: a.health.current,
                shared_target: a.ai.shared_target(),
                neighbors: a.neighbors.len(),
            })
            .collect();

        let villagers = world
            .villagers
            .iter()
            .map(|v| VillagerSnapshot {
                id: v.id,
                name: v.name.clone(),
                job: v.job.kind(),
                state: v.job.state_name(),
                position: v.position(),
                stamina: v.job.core().stamina.current,
                level: v.job.core().level,
            })
            .collect();

        let facilities = world
            .facilities
            .iter()
            .map(|f| FacilitySnapshot {
                id: f.id,
                facility_type: f.facility_type,
                level: f.level,
                position: f.position,
                users: f.users().len(),
                capacity: f.capacity(),
                open_orders: f.workshop().map_or(0, |w| w.orders.unprocessed()),
            })
            .collect();

        let build_requests = world
            .builds
            .iter()
            .map(|r| BuildRequestSnapshot {
                id: r.id,
                facility_type: r.payload.facility_type,
                upgrade: r.payload.upgrade,
                state: r.state,
                progress: r.progress,
            })
            .collect();

        let stock = ItemType::ALL
            .iter()
            .map(|item| (*item, world.facilities.stock_of(*item)))
            .filter(|(_, n)| *n > 0)
            .collect();

        let collectibles = [
            CollectibleKind::Tree,
            CollectibleKind::Rock,
            CollectibleKind::Grass,
            CollectibleKind::Carcass,
        ]
        .iter()
        .map(|kind| (*kind, world.collectibles.count_of(*kind)))
        .collect();

        Self {
            seed: world.seed,
            tick: world.clock.current_tick(),
            day: world.clock.current_day(),
            phase: world.clock.phase(),
            width: world.field.width(),
            height: world.field.height(),
            terrain: world.field.terrain_map(),
            territory: world.field.territory_map(),
            animals,
            villagers,
            facilities,
            stock,
            collectibles,
            build_requests,
            pending_generation: world.generation.pending(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    #[test]
    fn test_capture_generated_world() {
        let world = World::generate(SimulationConfig::default(), 8).unwrap();
        let snap = WorldSnapshot::capture(&world);
        assert_eq!(snap.terrain.len(), snap.width * snap.height);
        assert_eq!(snap.animals.len(), world.animals.len());
        assert_eq!(snap.facilities.len(), 2);
        assert!(snap.stock.contains(&(ItemType::Wood, 12)));
    }

    #[test]
    fn test_json_has_sections() {
        let world = World::generate(SimulationConfig::default(), 8).unwrap();
        let json = WorldSnapshot::capture(&world).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["tick", "phase", "animals", "villagers", "facilities", "stock", "build_requests"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
