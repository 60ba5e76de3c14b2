//! Field grid - terrain, territory and cell ownership
//!
//! A fixed grid of cells laid over the play area. Layout fills it once at
//! world generation; after that only the use flag and occupant change, as
//! objects claim and release cells.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{CellCoord, EntityId, Species};
use crate::spatial::Grid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    #[default]
    Empty,
    Tree,
    Rock,
    Grass,
    Buildable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Territory {
    #[default]
    None,
    Human,
    Wolf,
    Deer,
}

impl Territory {
    pub fn of(species: Species) -> Territory {
        match species {
            Species::Human => Territory::Human,
            Species::Wolf => Territory::Wolf,
            Species::Deer => Territory::Deer,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCell {
    pub terrain: TerrainType,
    pub territory: Territory,
    pub in_use: bool,
    pub occupant: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub struct FieldGrid {
    grid: Grid<FieldCell>,
}

impl FieldGrid {
    /// Blank field centred on the world origin
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            grid: Grid::centered(width, height, cell_size),
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&FieldCell> {
        self.grid.get(coord.x, coord.y)
    }

    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut FieldCell> {
        self.grid.get_mut(coord.x, coord.y)
    }

    pub fn world_to_cell(&self, pos: Vec3) -> CellCoord {
        self.grid.world_to_cell(pos)
    }

    pub fn cell_center(&self, coord: CellCoord) -> Vec3 {
        self.grid.cell_center(coord.x, coord.y)
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.grid.bounds()
    }

    /// Clamp a world position into the field
    pub fn clamp_position(&self, pos: Vec3) -> Vec3 {
        let (min, max) = self.bounds();
        Vec3::new(pos.x.clamp(min.x, max.x), pos.y, pos.z.clamp(min.z, max.z))
    }

    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.grid.coords()
    }

    pub fn center(&self) -> CellCoord {
        CellCoord::new(self.width() / 2, self.height() / 2)
    }

    /// Whether a cell lies in the square village zone around the centre
    pub fn in_village(&self, coord: CellCoord, radius: usize) -> bool {
        coord.chebyshev(&self.center()) <= radius
    }

    pub fn territory_at(&self, pos: Vec3) -> Territory {
        self.grid
            .sample(pos)
            .map(|c| c.territory)
            .unwrap_or_default()
    }

    /// Mark a cell used by `owner`. Fails if it is already in use.
    pub fn claim(&mut self, coord: CellCoord, owner: EntityId) -> bool {
        match self.cell_mut(coord) {
            Some(cell) if !cell.in_use => {
                cell.in_use = true;
                cell.occupant = Some(owner);
                true
            }
            _ => false,
        }
    }

    /// Free a cell held by `owner`
    pub fn release(&mut self, coord: CellCoord, owner: EntityId) -> bool {
        match self.cell_mut(coord) {
            Some(cell) if cell.occupant == Some(owner) => {
                cell.in_use = false;
                cell.occupant = None;
                true
            }
            _ => false,
        }
    }

    /// Free cells matching a predicate
    pub fn free_cells<F>(&self, filter: F) -> Vec<CellCoord>
    where
        F: Fn(&FieldCell) -> bool,
    {
        self.coords()
            .filter(|c| self.cell(*c).is_some_and(|cell| !cell.in_use && filter(cell)))
            .collect()
    }

    /// Closest free buildable cell, searching rings outward from `from`
    pub fn find_buildable_near(&self, from: CellCoord) -> Option<CellCoord> {
        let max_ring = self.width().max(self.height());
        for ring in 0..=max_ring {
            let x0 = from.x as i64 - ring as i64;
            let y0 = from.y as i64 - ring as i64;
            let x1 = from.x as i64 + ring as i64;
            let y1 = from.y as i64 + ring as i64;
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let on_ring = x == x0 || x == x1 || y == y0 || y == y1;
                    if !on_ring || x < 0 || y < 0 {
                        continue;
                    }
                    let coord = CellCoord::new(x as usize, y as usize);
                    if let Some(cell) = self.cell(coord) {
                        if cell.terrain == TerrainType::Buildable && !cell.in_use {
                            return Some(coord);
                        }
                    }
                }
            }
        }
        None
    }

    pub fn count_terrain(&self, terrain: TerrainType) -> usize {
        self.coords()
            .filter(|c| self.cell(*c).is_some_and(|cell| cell.terrain == terrain))
            .count()
    }

    pub fn count_territory(&self, territory: Territory) -> usize {
        self.coords()
            .filter(|c| self.cell(*c).is_some_and(|cell| cell.territory == territory))
            .count()
    }

    /// Terrain of every cell, row-major
    pub fn terrain_map(&self) -> Vec<TerrainType> {
        self.coords()
            .filter_map(|c| self.cell(c).map(|cell| cell.terrain))
            .collect()
    }

    pub fn territory_map(&self) -> Vec<Territory> {
        self.coords()
            .filter_map(|c| self.cell(c).map(|cell| cell.territory))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buildable_field() -> FieldGrid {
        let mut field = FieldGrid::new(10, 10, 2.0);
        for coord in field.coords().collect::<Vec<_>>() {
            field.cell_mut(coord).unwrap().terrain = TerrainType::Buildable;
        }
        field
    }

    #[test]
    fn test_claim_and_release() {
        let mut field = buildable_field();
        let c = CellCoord::new(3, 4);
        assert!(field.claim(c, EntityId(1)));
        assert!(!field.claim(c, EntityId(2)));
        assert!(!field.release(c, EntityId(2)));
        assert!(field.release(c, EntityId(1)));
        assert!(field.claim(c, EntityId(2)));
    }

    #[test]
    fn test_find_buildable_near_skips_used() {
        let mut field = buildable_field();
        let center = field.center();
        assert_eq!(field.find_buildable_near(center), Some(center));
        field.claim(center, EntityId(1));
        let next = field.find_buildable_near(center).unwrap();
        assert_eq!(next.chebyshev(&center), 1);
    }

    #[test]
    fn test_find_buildable_none() {
        let field = FieldGrid::new(4, 4, 1.0);
        assert_eq!(field.find_buildable_near(CellCoord::new(0, 0)), None);
    }

    #[test]
    fn test_world_cell_roundtrip() {
        let field = FieldGrid::new(50, 50, 4.0);
        let c = CellCoord::new(12, 40);
        assert_eq!(field.world_to_cell(field.cell_center(c)), c);
        assert_eq!(field.world_to_cell(Vec3::ZERO), CellCoord::new(25, 25));
    }

    #[test]
    fn test_village_zone() {
        let field = FieldGrid::new(50, 50, 4.0);
        assert!(field.in_village(CellCoord::new(30, 20), 5));
        assert!(!field.in_village(CellCoord::new(31, 25), 5));
    }

    #[test]
    fn test_clamp_position() {
        let field = FieldGrid::new(10, 10, 1.0);
        let p = field.clamp_position(Vec3::new(100.0, 0.0, -100.0));
        assert_eq!(p, Vec3::new(5.0, 0.0, -5.0));
    }
}
