//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for anything that lives in the world
///
/// Villagers, animals, facilities and collectibles share one id space so a
/// claim slot or a field cell can name its owner without knowing its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Hands out entity ids in spawn order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> EntityId {
        if self.next == 0 {
            self.next = 1;
        }
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Species enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Human,
    Deer,
    Wolf,
}

impl Species {
    /// The species this one watches out for (prey) or hunts (predator)
    pub fn opponent(&self) -> Option<Species> {
        match self {
            Species::Deer => Some(Species::Wolf),
            Species::Wolf => Some(Species::Deer),
            Species::Human => None,
        }
    }
}

/// Grid cell coordinate on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in cells
    pub fn chebyshev(&self, other: &CellCoord) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_allocator_is_sequential() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
    }

    #[test]
    fn test_default_allocator_never_hands_out_zero() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(), EntityId(1));
    }

    #[test]
    fn test_species_opponents() {
        assert_eq!(Species::Deer.opponent(), Some(Species::Wolf));
        assert_eq!(Species::Wolf.opponent(), Some(Species::Deer));
        assert_eq!(Species::Human.opponent(), None);
    }

    #[test]
    fn test_cell_chebyshev() {
        let a = CellCoord::new(2, 3);
        let b = CellCoord::new(5, 1);
        assert_eq!(a.chebyshev(&b), 3);
        assert_eq!(b.chebyshev(&a), 3);
    }
}
