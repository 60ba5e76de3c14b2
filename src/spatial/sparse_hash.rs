//! Sparse hash grid for neighbour and nearest-entity queries
//!
//! Rebuilt from a snapshot each tick. Entries carry a small payload so
//! callers can filter (species, stamina, shared target) without reaching
//! back into the entity that produced them.

use ahash::AHashMap;
use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::core::types::EntityId;

#[derive(Debug, Clone)]
pub struct IndexedEntry<T> {
    pub id: EntityId,
    pub position: Vec3,
    pub data: T,
}

/// Sparse hash grid keyed on XZ cells
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
    entries: Vec<IndexedEntry<T>>,
    by_id: AHashMap<EntityId, usize>,
}

impl<T> SpatialIndex<T> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            entries: Vec::new(),
            by_id: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec3) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, id: EntityId, position: Vec3, data: T) {
        let idx = self.entries.len();
        let coord = self.cell_coord(position);
        self.cells.entry(coord).or_default().push(idx);
        self.by_id.insert(id, idx);
        self.entries.push(IndexedEntry { id, position, data });
    }

    pub fn get(&self, id: EntityId) -> Option<&IndexedEntry<T>> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedEntry<T>> {
        self.entries.iter()
    }

    /// Entries within `radius` of `center`
    pub fn within(&self, center: Vec3, radius: f32) -> impl Iterator<Item = &IndexedEntry<T>> + '_ {
        let (cx, cy) = self.cell_coord(center);
        let reach = (radius / self.cell_size).ceil().max(0.0) as i32;

        (-reach..=reach)
            .flat_map(move |dx| (-reach..=reach).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |coord| self.cells.get(&coord))
            .flatten()
            .map(move |&idx| &self.entries[idx])
            .filter(move |entry| entry.position.distance(center) <= radius)
    }

    /// Nearest entry passing `filter`, not in `exclude`
    ///
    /// With a radius only the covering cells are searched, without one every
    /// entry is considered.
    pub fn nearest<F>(
        &self,
        center: Vec3,
        radius: Option<f32>,
        exclude: &[EntityId],
        filter: F,
    ) -> Option<&IndexedEntry<T>>
    where
        F: Fn(&IndexedEntry<T>) -> bool,
    {
        let keep = |entry: &&IndexedEntry<T>| !exclude.contains(&entry.id) && filter(entry);
        let by_distance = |entry: &&IndexedEntry<T>| OrderedFloat(entry.position.distance(center));

        match radius {
            Some(r) => self.within(center, r).filter(keep).min_by_key(by_distance),
            None => self.entries.iter().filter(keep).min_by_key(by_distance),
        }
    }

    /// Rebuild index from a snapshot
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (EntityId, Vec3, T)>) {
        self.clear();
        for (id, position, data) in entries {
            self.insert(id, position, data);
        }
    }
}
