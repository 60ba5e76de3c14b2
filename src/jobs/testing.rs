//! Owned world pieces for driving a job in unit tests

use glam::Vec3;

use crate::city::{BuildManager, FacilityRegistry, FacilityType, ItemType};
use crate::core::config::{FacilityConfig, GenerationConfig, JobConfig};
use crate::core::types::{EntityId, IdAllocator};
use crate::jobs::{JobContext, JobEvent};
use crate::world::{CollectibleStore, FieldGrid, GenerationManager, TerrainType};

pub struct Fixture {
    pub facilities: FacilityRegistry,
    pub builds: BuildManager,
    pub collectibles: CollectibleStore,
    pub field: FieldGrid,
    pub generation: GenerationManager,
    pub ids: IdAllocator,
    pub jobs: JobConfig,
    pub facility_config: FacilityConfig,
    pub generation_config: GenerationConfig,
    pub events: Vec<JobEvent>,
    pub dt: f32,
}

impl Fixture {
    /// 20x20 buildable field centred on the origin, nothing built
    pub fn new() -> Self {
        let mut field = FieldGrid::new(20, 20, 2.0);
        for coord in field.coords().collect::<Vec<_>>() {
            if let Some(cell) = field.cell_mut(coord) {
                cell.terrain = TerrainType::Buildable;
            }
        }
        let facility_config = FacilityConfig::default();
        Self {
            facilities: FacilityRegistry::new(facility_config.storage_capacity),
            builds: BuildManager::new(),
            collectibles: CollectibleStore::new(),
            field,
            generation: GenerationManager::new(),
            ids: IdAllocator::new(),
            jobs: JobConfig::default(),
            facility_config,
            generation_config: GenerationConfig::default(),
            events: Vec::new(),
            dt: 0.1,
        }
    }

    pub fn ctx(&mut self) -> JobContext<'_> {
        JobContext {
            facilities: &mut self.facilities,
            builds: &mut self.builds,
            collectibles: &mut self.collectibles,
            field: &mut self.field,
            generation: &mut self.generation,
            ids: &mut self.ids,
            jobs: &self.jobs,
            facility_config: &self.facility_config,
            generation_config: &self.generation_config,
            dt: self.dt,
            village_center: Vec3::ZERO,
            events: &mut self.events,
        }
    }

    /// Put a facility on the cell under `at`
    pub fn build(&mut self, facility_type: FacilityType, at: Vec3) -> EntityId {
        let id = self.ids.allocate();
        let cell = self.field.world_to_cell(at);
        self.field.claim(cell, id);
        self.facilities.spawn(id, facility_type, at, cell)
    }

    pub fn stock(&mut self, storage: EntityId, item: ItemType, count: u32) {
        if let Some(stock) = self.facilities.get_mut(storage).and_then(|f| f.stockpile_mut()) {
            stock.add(item, count);
        }
    }
}
