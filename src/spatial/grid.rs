//! Generic grid for spatial data laid on the XZ plane

use glam::Vec3;

use crate::core::types::CellCoord;

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    /// World position of the corner of cell (0, 0)
    pub origin: Vec3,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec3) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    /// Grid centred on the world origin
    pub fn centered(width: usize, height: usize, cell_size: f32) -> Self {
        let origin = Vec3::new(
            -(width as f32) * cell_size * 0.5,
            0.0,
            -(height as f32) * cell_size * 0.5,
        );
        Self::new(width, height, cell_size, origin)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            Some(&mut self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Convert world position to cell coordinates, clamped to the grid
    #[inline]
    pub fn world_to_cell(&self, pos: Vec3) -> CellCoord {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let y = ((pos.z - self.origin.z) / self.cell_size).floor() as i32;
        CellCoord::new(
            x.max(0).min(self.width as i32 - 1) as usize,
            y.max(0).min(self.height as i32 - 1) as usize,
        )
    }

    /// Sample grid at world position
    pub fn sample(&self, pos: Vec3) -> Option<&T> {
        let c = self.world_to_cell(pos);
        self.get(c.x, c.y)
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, x: usize, y: usize) -> Vec3 {
        Vec3::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            0.0,
            self.origin.z + (y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Minimum and maximum world corners
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let max = Vec3::new(
            self.origin.x + self.width as f32 * self.cell_size,
            0.0,
            self.origin.z + self.height as f32 * self.cell_size,
        );
        (self.origin, max)
    }

    /// All cell coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| CellCoord::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_out_of_bounds() {
        let mut grid: Grid<u8> = Grid::new(4, 3, 1.0, Vec3::ZERO);
        grid.set(3, 2, 7);
        assert_eq!(grid.get(3, 2), Some(&7));
        assert_eq!(grid.get(4, 0), None);
        grid.set(10, 10, 1);
    }

    #[test]
    fn test_world_to_cell_roundtrip() {
        let grid: Grid<u8> = Grid::centered(10, 10, 2.0);
        let center = grid.cell_center(3, 7);
        assert_eq!(grid.world_to_cell(center), CellCoord::new(3, 7));
    }

    #[test]
    fn test_world_to_cell_clamps() {
        let grid: Grid<u8> = Grid::centered(10, 10, 2.0);
        assert_eq!(grid.world_to_cell(Vec3::new(-500.0, 0.0, 500.0)), CellCoord::new(0, 9));
    }

    #[test]
    fn test_centered_bounds() {
        let grid: Grid<u8> = Grid::centered(50, 50, 4.0);
        let (min, max) = grid.bounds();
        assert!((min.x + 100.0).abs() < 1e-4);
        assert!((max.z - 100.0).abs() < 1e-4);
    }
}
