//! Stockpile - item storage held by a storage facility

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::city::items::ItemType;

/// Items stored in one storage facility
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    /// Items stored: type -> (current, capacity)
    items: AHashMap<ItemType, (u32, u32)>,
    /// Capacity given to item types seen for the first time
    default_capacity: u32,
}

impl Stockpile {
    pub fn new(default_capacity: u32) -> Self {
        Self {
            items: AHashMap::new(),
            default_capacity,
        }
    }

    /// Set capacity for an item type
    pub fn set_capacity(&mut self, item: ItemType, capacity: u32) {
        let entry = self.items.entry(item).or_insert((0, 0));
        entry.1 = capacity;
    }

    /// Current amount of an item
    pub fn get(&self, item: ItemType) -> u32 {
        self.items.get(&item).map(|(c, _)| *c).unwrap_or(0)
    }

    pub fn capacity(&self, item: ItemType) -> u32 {
        self.items
            .get(&item)
            .map(|(_, cap)| *cap)
            .unwrap_or(self.default_capacity)
    }

    /// Try to add items, returns amount actually added
    pub fn add(&mut self, item: ItemType, amount: u32) -> u32 {
        let entry = self.items.entry(item).or_insert((0, self.default_capacity));
        let space = entry.1.saturating_sub(entry.0);
        let added = amount.min(space);
        entry.0 += added;
        added
    }

    /// Try to remove items, returns amount actually removed
    pub fn remove(&mut self, item: ItemType, amount: u32) -> u32 {
        match self.items.get_mut(&item) {
            Some(entry) => {
                let removed = amount.min(entry.0);
                entry.0 -= removed;
                removed
            }
            None => 0,
        }
    }

    /// Withdraw a single item
    pub fn take_one(&mut self, item: ItemType) -> bool {
        self.remove(item, 1) == 1
    }

    pub fn has_materials(&self, requirements: &[(ItemType, u32)]) -> bool {
        requirements.iter().all(|(item, amount)| self.get(*item) >= *amount)
    }

    /// Non-empty entries, sorted by item for stable output
    pub fn contents(&self) -> Vec<(ItemType, u32)> {
        let mut out: Vec<_> = self
            .items
            .iter()
            .filter(|(_, (count, _))| *count > 0)
            .map(|(item, (count, _))| (*item, *count))
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stockpile_add_remove() {
        let mut stockpile = Stockpile::new(100);
        stockpile.set_capacity(ItemType::Wood, 50);

        assert_eq!(stockpile.add(ItemType::Wood, 30), 30);
        assert_eq!(stockpile.get(ItemType::Wood), 30);

        // Can't exceed capacity
        assert_eq!(stockpile.add(ItemType::Wood, 30), 20);
        assert_eq!(stockpile.get(ItemType::Wood), 50);

        assert_eq!(stockpile.remove(ItemType::Wood, 20), 20);
        assert_eq!(stockpile.get(ItemType::Wood), 30);
    }

    #[test]
    fn test_default_capacity_applies_to_new_items() {
        let mut stockpile = Stockpile::new(5);
        assert_eq!(stockpile.add(ItemType::Meal, 9), 5);
        assert_eq!(stockpile.capacity(ItemType::Tool), 5);
    }

    #[test]
    fn test_take_one() {
        let mut stockpile = Stockpile::new(10);
        stockpile.add(ItemType::Stone, 1);
        assert!(stockpile.take_one(ItemType::Stone));
        assert!(!stockpile.take_one(ItemType::Stone));
        assert!(!stockpile.take_one(ItemType::Grain));
    }

    #[test]
    fn test_has_materials_and_contents() {
        let mut stockpile = Stockpile::new(100);
        stockpile.add(ItemType::Wood, 4);
        stockpile.add(ItemType::Stone, 2);
        assert!(stockpile.has_materials(&[(ItemType::Wood, 4), (ItemType::Stone, 1)]));
        assert!(!stockpile.has_materials(&[(ItemType::Stone, 3)]));
        assert_eq!(
            stockpile.contents(),
            vec![(ItemType::Wood, 4), (ItemType::Stone, 2)]
        );
    }
}
