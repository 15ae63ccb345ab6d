//! Square sprite/tile atlas addressing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AtlasError {
    #[error("atlas cell {index} out of range (atlas has {cells} cells)")]
    CellOutOfRange { index: u32, cells: u32 },
    #[error("atlas must have at least one cell per side")]
    Empty,
}

/// An atlas of `cells_per_side x cells_per_side` equal cells, row-major from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasLayout {
    pub cells_per_side: u32,
}

impl AtlasLayout {
    pub fn new(cells_per_side: u32) -> Result<Self, AtlasError> {
        if cells_per_side == 0 {
            return Err(AtlasError::Empty);
        }
        Ok(Self { cells_per_side })
    }

    pub fn cell_count(&self) -> u32 {
        self.cells_per_side * self.cells_per_side
    }

    /// Uniform value for the sprite path: one cell in texture-coordinate units.
    pub fn inv_uv_mul(&self) -> f32 {
        1.0 / self.cells_per_side as f32
    }

    /// Sprite atlas base coordinate of a cell, in cell units (column, row).
    pub fn cell_origin(&self, index: u32) -> Result<Vec2, AtlasError> {
        if index >= self.cell_count() {
            return Err(AtlasError::CellOutOfRange {
                index,
                cells: self.cell_count(),
            });
        }
        Ok(Vec2::new(
            (index % self.cells_per_side) as f32,
            (index / self.cells_per_side) as f32,
        ))
    }

    /// Texture-space corners of a cell: top-left, top-right, bottom-right, bottom-left.
    pub fn tile_uvs(&self, index: u32) -> Result<[Vec2; 4], AtlasError> {
        let origin = self.cell_origin(index)?;
        let k = self.inv_uv_mul();
        Ok([Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y].map(|corner| (origin + corner) * k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_row_major() {
        let a = AtlasLayout::new(4).unwrap();
        assert_eq!(a.cell_origin(0).unwrap(), Vec2::ZERO);
        assert_eq!(a.cell_origin(5).unwrap(), Vec2::new(1.0, 1.0));
        assert_eq!(a.cell_origin(15).unwrap(), Vec2::new(3.0, 3.0));
        assert_eq!(
            a.cell_origin(16),
            Err(AtlasError::CellOutOfRange { index: 16, cells: 16 })
        );
    }

    #[test]
    fn tile_uvs_span_one_cell() {
        let a = AtlasLayout::new(4).unwrap();
        let uvs = a.tile_uvs(6).unwrap();
        assert_eq!(uvs[0], Vec2::new(0.5, 0.25));
        assert_eq!(uvs[2], Vec2::new(0.75, 0.5));
    }

    #[test]
    fn zero_cells_rejected() {
        assert_eq!(AtlasLayout::new(0), Err(AtlasError::Empty));
        assert_eq!(AtlasLayout::new(8).unwrap().inv_uv_mul(), 0.125);
    }
}
