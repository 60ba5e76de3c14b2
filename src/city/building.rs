//! Village facilities and the registry that owns them

use glam::Vec3;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::city::items::ItemType;
use crate::city::requests::RequestQueue;
use crate::city::stockpile::Stockpile;
use crate::core::types::{CellCoord, EntityId};

/// Type of facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityType {
    Storage,
    /// Rest house where workers recover stamina
    Refresh,
    Kitchen,
    Smithy,
    Farm,
}

impl FacilityType {
    /// Materials required to construct (or upgrade) this facility
    pub fn build_cost(&self) -> &'static [(ItemType, u32)] {
        match self {
            FacilityType::Storage => &[(ItemType::Wood, 6)],
            FacilityType::Refresh => &[(ItemType::Wood, 4)],
            FacilityType::Kitchen => &[(ItemType::Wood, 6), (ItemType::Stone, 4)],
            FacilityType::Smithy => &[(ItemType::Wood, 4), (ItemType::Stone, 8)],
            FacilityType::Farm => &[(ItemType::Wood, 2), (ItemType::Grass, 2)],
        }
    }

    /// Concurrent users at level 1
    pub fn base_capacity(&self) -> usize {
        match self {
            FacilityType::Storage => 8,
            FacilityType::Refresh => 2,
            FacilityType::Kitchen | FacilityType::Smithy | FacilityType::Farm => 1,
        }
    }

    /// Items a workshop of this type crafts
    pub fn products(&self) -> &'static [ItemType] {
        match self {
            FacilityType::Kitchen => &[ItemType::Meal, ItemType::Roast],
            FacilityType::Smithy => &[ItemType::Tool],
            _ => &[],
        }
    }
}

/// A queued crafting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftOrder {
    pub product: ItemType,
}

/// Order book of a kitchen or smithy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workshop {
    pub orders: RequestQueue<CraftOrder>,
    /// Seconds until the next stock check
    pub order_timer: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FacilityRole {
    Storage(Stockpile),
    Rest,
    Workshop(Workshop),
    Farm,
}

impl FacilityRole {
    fn for_type(facility_type: FacilityType, storage_capacity: u32) -> Self {
        match facility_type {
            FacilityType::Storage => FacilityRole::Storage(Stockpile::new(storage_capacity)),
            FacilityType::Refresh => FacilityRole::Rest,
            FacilityType::Kitchen | FacilityType::Smithy => FacilityRole::Workshop(Workshop::default()),
            FacilityType::Farm => FacilityRole::Farm,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: EntityId,
    pub facility_type: FacilityType,
    pub level: u32,
    pub position: Vec3,
    pub cell: CellCoord,
    /// Workers holding a claim on a slot
    users: Vec<EntityId>,
    /// Claimants that have arrived and are using the facility
    occupants: Vec<EntityId>,
    pub role: FacilityRole,
}

impl Facility {
    pub fn capacity(&self) -> usize {
        self.facility_type.base_capacity() * self.level.max(1) as usize
    }

    pub fn users(&self) -> &[EntityId] {
        &self.users
    }

    pub fn has_capacity(&self) -> bool {
        self.users.len() < self.capacity()
    }

    pub fn is_claimed_by(&self, worker: EntityId) -> bool {
        self.users.contains(&worker)
    }

    pub fn is_occupied_by(&self, worker: EntityId) -> bool {
        self.occupants.contains(&worker)
    }

    /// Claim a slot. Claiming twice is a no-op that still succeeds.
    pub fn reserve(&mut self, worker: EntityId) -> bool {
        if self.is_claimed_by(worker) {
            return true;
        }
        if !self.has_capacity() {
            return false;
        }
        self.users.push(worker);
        true
    }

    /// Mark a claimant as present
    pub fn begin_use(&mut self, worker: EntityId) -> bool {
        if !self.is_claimed_by(worker) {
            return false;
        }
        if !self.is_occupied_by(worker) {
            self.occupants.push(worker);
        }
        true
    }

    /// Drop a claim. Returns false if the worker held none.
    pub fn release(&mut self, worker: EntityId) -> bool {
        self.occupants.retain(|w| *w != worker);
        let before = self.users.len();
        self.users.retain(|w| *w != worker);
        before != self.users.len()
    }

    pub fn stockpile(&self) -> Option<&Stockpile> {
        match &self.role {
            FacilityRole::Storage(stock) => Some(stock),
            _ => None,
        }
    }

    pub fn stockpile_mut(&mut self) -> Option<&mut Stockpile> {
        match &mut self.role {
            FacilityRole::Storage(stock) => Some(stock),
            _ => None,
        }
    }

    pub fn workshop(&self) -> Option<&Workshop> {
        match &self.role {
            FacilityRole::Workshop(shop) => Some(shop),
            _ => None,
        }
    }

    pub fn workshop_mut(&mut self) -> Option<&mut Workshop> {
        match &mut self.role {
            FacilityRole::Workshop(shop) => Some(shop),
            _ => None,
        }
    }
}

/// Owns every facility in the village
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityRegistry {
    facilities: Vec<Facility>,
    storage_capacity: u32,
}

impl FacilityRegistry {
    pub fn new(storage_capacity: u32) -> Self {
        Self {
            facilities: Vec::new(),
            storage_capacity,
        }
    }

    pub fn count(&self) -> usize {
        self.facilities.len()
    }

    pub fn count_of(&self, facility_type: FacilityType) -> usize {
        self.iter_type(facility_type).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Facility> {
        self.facilities.iter_mut()
    }

    pub fn iter_type(&self, facility_type: FacilityType) -> impl Iterator<Item = &Facility> {
        self.facilities
            .iter()
            .filter(move |f| f.facility_type == facility_type)
    }

    /// Add a finished level-1 facility
    pub fn spawn(
        &mut self,
        id: EntityId,
        facility_type: FacilityType,
        position: Vec3,
        cell: CellCoord,
    ) -> EntityId {
        self.facilities.push(Facility {
            id,
            facility_type,
            level: 1,
            position,
            cell,
            users: Vec::new(),
            occupants: Vec::new(),
            role: FacilityRole::for_type(facility_type, self.storage_capacity),
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Facility> {
        self.facilities.iter_mut().find(|f| f.id == id)
    }

    /// Nearest facility of a type passing `filter`, skipping `exclude`
    pub fn nearest<F>(
        &self,
        facility_type: FacilityType,
        position: Vec3,
        exclude: &[EntityId],
        filter: F,
    ) -> Option<EntityId>
    where
        F: Fn(&Facility) -> bool,
    {
        self.iter_type(facility_type)
            .filter(|f| !exclude.contains(&f.id) && filter(f))
            .min_by_key(|f| OrderedFloat(f.position.distance(position)))
            .map(|f| f.id)
    }

    /// Nearest storage facility
    pub fn nearest_storage(&self, position: Vec3) -> Option<EntityId> {
        self.nearest(FacilityType::Storage, position, &[], |_| true)
    }

    /// Total of an item across every storage facility
    pub fn stock_of(&self, item: ItemType) -> u32 {
        self.facilities
            .iter()
            .filter_map(Facility::stockpile)
            .map(|s| s.get(item))
            .sum()
    }
}
