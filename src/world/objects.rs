//! Collectibles - trees, rocks, grass and carcasses on the field
//!
//! A gatherer claims a collectible by writing its own id into the
//! collectible's targeting slot. The slot is the only guard against two
//! gatherers working the same object.

use glam::Vec3;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{CellCoord, EntityId};
use crate::world::field::TerrainType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Tree,
    Rock,
    Grass,
    /// Left behind by a killed deer
    Carcass,
}

impl CollectibleKind {
    /// Terrain a collectible of this kind grows on
    pub fn terrain(&self) -> Option<TerrainType> {
        match self {
            CollectibleKind::Tree => Some(TerrainType::Tree),
            CollectibleKind::Rock => Some(TerrainType::Rock),
            CollectibleKind::Grass => Some(TerrainType::Grass),
            CollectibleKind::Carcass => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: EntityId,
    pub kind: CollectibleKind,
    pub position: Vec3,
    /// Field cell held by this object; carcasses lie wherever the deer fell
    pub cell: Option<CellCoord>,
    pub amount: u32,
    pub targeting_id: Option<EntityId>,
}

impl Collectible {
    pub fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    pub fn is_claimable_by(&self, worker: EntityId) -> bool {
        self.targeting_id.map_or(true, |t| t == worker)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectibleStore {
    items: Vec<Collectible>,
}

impl CollectibleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collectible> {
        self.items.iter()
    }

    pub fn count_of(&self, kind: CollectibleKind) -> usize {
        self.items.iter().filter(|c| c.kind == kind).count()
    }

    pub fn spawn(
        &mut self,
        id: EntityId,
        kind: CollectibleKind,
        position: Vec3,
        cell: Option<CellCoord>,
        amount: u32,
    ) -> EntityId {
        self.items.push(Collectible {
            id,
            kind,
            position,
            cell,
            amount,
            targeting_id: None,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Collectible> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Collectible> {
        self.items.iter_mut().find(|c| c.id == id)
    }

    /// Nearest non-depleted collectible of a kind, skipping `exclude`
    pub fn nearest(&self, kind: CollectibleKind, position: Vec3, exclude: &[EntityId]) -> Option<EntityId> {
        self.items
            .iter()
            .filter(|c| c.kind == kind && !c.is_depleted() && !exclude.contains(&c.id))
            .min_by_key(|c| OrderedFloat(c.position.distance(position)))
            .map(|c| c.id)
    }

    /// Claim the nearest collectible nobody else is targeting
    ///
    /// When the nearest candidate belongs to another worker it goes on the
    /// exclusion list and the search runs again.
    pub fn claim_nearest(&mut self, kind: CollectibleKind, position: Vec3, worker: EntityId) -> Option<EntityId> {
        let mut exclude = Vec::new();
        loop {
            let id = self.nearest(kind, position, &exclude)?;
            let item = self.get_mut(id)?;
            if item.is_claimable_by(worker) {
                item.targeting_id = Some(worker);
                return Some(id);
            }
            exclude.push(id);
        }
    }

    /// Clear the targeting slot if `worker` holds it
    pub fn release(&mut self, id: EntityId, worker: EntityId) -> bool {
        match self.get_mut(id) {
            Some(item) if item.targeting_id == Some(worker) => {
                item.targeting_id = None;
                true
            }
            _ => false,
        }
    }

    /// Take up to `amount` units. Returns what was actually taken.
    pub fn take(&mut self, id: EntityId, amount: u32) -> u32 {
        match self.get_mut(id) {
            Some(item) => {
                let taken = amount.min(item.amount);
                item.amount -= taken;
                taken
            }
            None => 0,
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Collectible> {
        let idx = self.items.iter().position(|c| c.id == id)?;
        Some(self.items.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CollectibleStore {
        let mut store = CollectibleStore::new();
        store.spawn(EntityId(1), CollectibleKind::Tree, Vec3::new(2.0, 0.0, 0.0), None, 3);
        store.spawn(EntityId(2), CollectibleKind::Tree, Vec3::new(5.0, 0.0, 0.0), None, 3);
        store.spawn(EntityId(3), CollectibleKind::Rock, Vec3::new(1.0, 0.0, 0.0), None, 3);
        store
    }

    #[test]
    fn test_claim_skips_other_workers_target() {
        let mut store = store();
        let a = store.claim_nearest(CollectibleKind::Tree, Vec3::ZERO, EntityId(100));
        let b = store.claim_nearest(CollectibleKind::Tree, Vec3::ZERO, EntityId(101));
        let c = store.claim_nearest(CollectibleKind::Tree, Vec3::ZERO, EntityId(102));
        assert_eq!(a, Some(EntityId(1)));
        assert_eq!(b, Some(EntityId(2)));
        assert_eq!(c, None);
        assert_eq!(store.get(EntityId(2)).unwrap().targeting_id, Some(EntityId(101)));
    }

    #[test]
    fn test_reclaim_by_same_worker() {
        let mut store = store();
        store.claim_nearest(CollectibleKind::Tree, Vec3::ZERO, EntityId(100));
        let again = store.claim_nearest(CollectibleKind::Tree, Vec3::ZERO, EntityId(100));
        assert_eq!(again, Some(EntityId(1)));
    }

    #[test]
    fn test_release_only_by_holder() {
        let mut store = store();
        store.claim_nearest(CollectibleKind::Rock, Vec3::ZERO, EntityId(7));
        assert!(!store.release(EntityId(3), EntityId(8)));
        assert!(store.release(EntityId(3), EntityId(7)));
        assert_eq!(store.get(EntityId(3)).unwrap().targeting_id, None);
    }

    #[test]
    fn test_take_depletes() {
        let mut store = store();
        assert_eq!(store.take(EntityId(3), 2), 2);
        assert_eq!(store.take(EntityId(3), 2), 1);
        assert!(store.get(EntityId(3)).unwrap().is_depleted());
        assert_eq!(store.nearest(CollectibleKind::Rock, Vec3::ZERO, &[]), None);
        assert!(store.remove(EntityId(3)).is_some());
        assert_eq!(store.take(EntityId(3), 1), 0);
    }
}
