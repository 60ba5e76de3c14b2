//! ECS World - owns every entity and the shared village state

use glam::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::city::{BuildManager, FacilityRegistry, FacilityType};
use crate::core::calendar::GameClock;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::rng::{mix64, sim_rng, SimRng};
use crate::core::types::{CellCoord, EntityId, IdAllocator, Species, Tick};
use crate::entity::animal::Animal;
use crate::entity::villager::{villager_name, Villager};
use crate::jobs::JobKind;
use crate::world::generators::default_generators;
use crate::world::{
    generate_field, populate_collectibles, CollectibleKind, CollectibleStore, FieldGrid, GenerationManager,
    Territory,
};

/// The simulation world
///
/// Every cross-reference between entities is an [`EntityId`] or a request
/// handle resolved through this struct; nothing holds a pointer into it.
#[derive(Debug)]
pub struct World {
    pub seed: u64,
    pub config: SimulationConfig,
    pub clock: GameClock,
    pub field: FieldGrid,
    pub animals: Vec<Animal>,
    pub villagers: Vec<Villager>,
    pub facilities: FacilityRegistry,
    pub collectibles: CollectibleStore,
    pub builds: BuildManager,
    pub generation: GenerationManager,
    pub rng: SimRng,
    pub ids: IdAllocator,
}

impl World {
    /// Blank field of the configured size with nothing on it
    pub fn empty(config: SimulationConfig, seed: u64) -> Self {
        let w = &config.world;
        let field = FieldGrid::new(w.width, w.height, w.cell_size);
        let clock = GameClock::new(
            config.clock.delta(),
            config.clock.day_length_seconds,
            config.clock.start_fraction,
        );
        let facilities = FacilityRegistry::new(config.facilities.storage_capacity);
        Self {
            seed,
            clock,
            field,
            animals: Vec::new(),
            villagers: Vec::new(),
            facilities,
            collectibles: CollectibleStore::new(),
            builds: BuildManager::new(),
            generation: GenerationManager::new(),
            rng: sim_rng(seed),
            ids: IdAllocator::new(),
            config,
        }
    }

    /// Lay out the field and populate it: village, wildlife, villagers
    pub fn generate(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut world = Self::empty(config, seed);

        world.field = generate_field(&world.config.world, seed, &mut world.rng);
        populate_collectibles(
            &mut world.field,
            &mut world.collectibles,
            &mut world.ids,
            &world.config.world,
            &mut world.rng,
        );

        let w = &world.config.world;
        let amounts = [
            (CollectibleKind::Tree, w.tree_amount),
            (CollectibleKind::Rock, w.rock_amount),
            (CollectibleKind::Grass, w.grass_amount),
        ];
        for generator in default_generators(&amounts) {
            world.generation.register(generator);
        }

        world.found_village();
        world.spawn_wildlife();
        for kind in world.config.world.villagers.clone() {
            world.spawn_villager(kind);
        }

        info!(
            seed,
            collectibles = world.collectibles.len(),
            deer = world.living_count(Species::Deer),
            wolves = world.living_count(Species::Wolf),
            villagers = world.villagers.len(),
            "World generated"
        );
        Ok(world)
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    pub fn village_center(&self) -> Vec3 {
        self.field.cell_center(self.field.center())
    }

    /// Starting storage (stocked) and rest house
    fn found_village(&mut self) {
        if let Some(storage) = self.place_facility(FacilityType::Storage) {
            let stock: Vec<_> = self.config.world.initial_stock.iter().map(|e| (e.item, e.count)).collect();
            if let Some(pile) = self.facilities.get_mut(storage).and_then(|f| f.stockpile_mut()) {
                for (item, count) in stock {
                    pile.add(item, count);
                }
            }
        }
        self.place_facility(FacilityType::Refresh);
    }

    /// Put a finished facility on the free buildable cell nearest the centre
    pub fn place_facility(&mut self, facility_type: FacilityType) -> Option<EntityId> {
        let Some(cell) = self.field.find_buildable_near(self.field.center()) else {
            warn!(?facility_type, "No buildable cell left for facility");
            return None;
        };
        let id = self.ids.allocate();
        self.field.claim(cell, id);
        let position = self.field.cell_center(cell);
        Some(self.facilities.spawn(id, facility_type, position, cell))
    }

    fn spawn_wildlife(&mut self) {
        let deer = self.config.world.deer_count;
        let wolves = self.config.world.wolf_count;
        if let Some(anchor) = self.territory_anchor(Territory::Deer) {
            for _ in 0..deer {
                let position = self.scatter(anchor);
                self.spawn_deer(position);
            }
        } else if deer > 0 {
            warn!("No deer territory on the field; herd not spawned");
        }
        if let Some(anchor) = self.territory_anchor(Territory::Wolf) {
            for _ in 0..wolves {
                let position = self.scatter(anchor);
                self.spawn_wolf(position);
            }
        } else if wolves > 0 {
            warn!("No wolf territory on the field; pack not spawned");
        }
    }

    fn territory_anchor(&mut self, territory: Territory) -> Option<CellCoord> {
        let cells = self.field.free_cells(|cell| cell.territory == territory);
        cells.choose(&mut self.rng).copied()
    }

    /// Random point within a cell of `anchor`'s centre
    fn scatter(&mut self, anchor: CellCoord) -> Vec3 {
        let half = self.field.cell_size();
        let offset = Vec3::new(self.rng.gen_range(-half..half), 0.0, self.rng.gen_range(-half..half));
        self.field.clamp_position(self.field.cell_center(anchor) + offset)
    }

    /// New deer; its private generator comes from its own id under the
    /// world seed and the spawn point
    pub fn spawn_deer(&mut self, position: Vec3) -> EntityId {
        let id = self.ids.allocate();
        let identity = mix64(self.seed ^ id.0);
        self.animals.push(Animal::deer(id, position, identity, &self.config.deer));
        id
    }

    pub fn spawn_wolf(&mut self, position: Vec3) -> EntityId {
        let id = self.ids.allocate();
        self.animals.push(Animal::wolf(id, position, &self.config.wolf));
        id
    }

    pub fn spawn_villager(&mut self, kind: JobKind) -> EntityId {
        let id = self.ids.allocate();
        let name = villager_name(self.villagers.len());
        let offset = Vec3::new(self.rng.gen_range(-2.0..2.0), 0.0, self.rng.gen_range(-2.0..2.0));
        let position = self.village_center() + offset;
        self.villagers
            .push(Villager::new(id, name, position, kind, &self.config.jobs));
        id
    }

    /// Meat left where a deer fell
    pub fn spawn_carcass(&mut self, position: Vec3) -> EntityId {
        let id = self.ids.allocate();
        let amount = self.config.world.carcass_amount;
        self.collectibles
            .spawn(id, CollectibleKind::Carcass, position, None, amount)
    }

    pub fn animal(&self, id: EntityId) -> Option<&Animal> {
        self.animals.iter().find(|a| a.id == id)
    }

    pub fn villager(&self, id: EntityId) -> Option<&Villager> {
        self.villagers.iter().find(|v| v.id == id)
    }

    pub fn living_count(&self, species: Species) -> usize {
        self.animals
            .iter()
            .filter(|a| a.alive && a.species == species)
            .count()
    }
}
