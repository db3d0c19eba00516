//! The cell grid instances are placed on, and the tile map it comes from.

use std::path::Path;

use glam::{UVec2, Vec2};

use crate::LodError;

/// A `width x height` grid of unit cells on the ground plane.
///
/// Grid position `(x, y)` maps to world `(x, z)`. Cell `(x, y)` covers
/// `[x, x + 1) x [y, y + 1)` and has linear index `x + y * width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Result<Self, LodError> {
        if width == 0 || height == 0 {
            return Err(LodError::EmptyGrid);
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`, the shape used in mismatch errors.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains_cell(&self, cell: UVec2) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Linear index of a cell. The cell must be inside the grid.
    pub fn cell_index(&self, cell: UVec2) -> usize {
        debug_assert!(self.contains_cell(cell));
        cell.x as usize + cell.y as usize * self.width as usize
    }

    /// Inverse of [`Grid::cell_index`].
    pub fn cell_at(&self, index: usize) -> UVec2 {
        let w = self.width as usize;
        UVec2::new((index % w) as u32, (index / w) as u32)
    }

    /// Clamp a position onto the grid's extent `[0, width] x [0, height]`.
    pub fn clamp_position(&self, position: Vec2) -> Vec2 {
        position.clamp(Vec2::ZERO, Vec2::new(self.width as f32, self.height as f32))
    }

    /// The cell occupied by `position`, clamping positions outside the grid.
    pub fn cell_of(&self, position: Vec2) -> UVec2 {
        let p = self.clamp_position(position).floor().as_uvec2();
        p.min(UVec2::new(self.width - 1, self.height - 1))
    }

    /// The four corners of a cell: min, +x, +y, max.
    pub fn cell_corners(&self, cell: UVec2) -> [Vec2; 4] {
        let min = cell.as_vec2();
        [min, min + Vec2::X, min + Vec2::Y, min + Vec2::ONE]
    }

    pub fn cell_center(&self, cell: UVec2) -> Vec2 {
        cell.as_vec2() + Vec2::splat(0.5)
    }
}

/// Single-channel map of the level layout. Tile value 0 is a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TileMap {
    /// Keep the first channel of each pixel of an interleaved image buffer.
    pub fn from_rgb_components(
        pixels: &[u8],
        width: u32,
        height: u32,
        components: usize,
    ) -> Result<Self, LodError> {
        let count = width as usize * height as usize;
        let expected = count * components.max(1);
        if count == 0 {
            return Err(LodError::EmptyGrid);
        }
        if pixels.len() < expected {
            return Err(LodError::TileMapData {
                expected,
                actual: pixels.len(),
            });
        }
        let data = pixels.iter().step_by(components.max(1)).take(count).copied().collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode a tile map image, one pixel per cell.
    pub fn load(path: &Path) -> Result<Self, LodError> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        Self::from_rgb_components(img.as_raw(), width, height, 3)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile value at `(x, y)`; positions outside the map read as walls.
    pub fn tile(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.data[(y * self.width as i64 + x) as usize]
    }

    pub fn is_wall(&self, x: i64, y: i64) -> bool {
        self.tile(x, y) == 0
    }

    /// The grid covering this map.
    pub fn grid(&self) -> Grid {
        Grid {
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_is_rejected() {
        assert!(matches!(Grid::new(0, 4), Err(LodError::EmptyGrid)));
        assert!(matches!(Grid::new(4, 0), Err(LodError::EmptyGrid)));
    }

    #[test]
    fn test_cell_index_is_row_major() {
        let grid = Grid::new(5, 3).unwrap();
        assert_eq!(grid.cell_index(UVec2::new(0, 0)), 0);
        assert_eq!(grid.cell_index(UVec2::new(4, 0)), 4);
        assert_eq!(grid.cell_index(UVec2::new(1, 2)), 11);
        for i in 0..grid.cell_count() {
            assert_eq!(grid.cell_index(grid.cell_at(i)), i);
        }
    }

    /// Out-of-range positions clamp to the nearest border cell.
    #[test]
    fn test_cell_of_clamps() {
        let grid = Grid::new(4, 6).unwrap();
        assert_eq!(grid.cell_of(Vec2::new(1.5, 2.9)), UVec2::new(1, 2));
        assert_eq!(grid.cell_of(Vec2::new(-3.0, -0.1)), UVec2::new(0, 0));
        assert_eq!(grid.cell_of(Vec2::new(4.0, 6.0)), UVec2::new(3, 5));
        assert_eq!(grid.cell_of(Vec2::new(100.0, 2.0)), UVec2::new(3, 2));
    }

    #[test]
    fn test_corners_and_center() {
        let grid = Grid::new(4, 4).unwrap();
        let cell = UVec2::new(2, 1);
        assert_eq!(
            grid.cell_corners(cell),
            [
                Vec2::new(2.0, 1.0),
                Vec2::new(3.0, 1.0),
                Vec2::new(2.0, 2.0),
                Vec2::new(3.0, 2.0)
            ]
        );
        assert_eq!(grid.cell_center(cell), Vec2::new(2.5, 1.5));
    }

    /// Only the first channel of each pixel is kept.
    #[test]
    fn test_tile_map_keeps_first_channel() {
        let pixels = [
            255, 1, 2, 0, 9, 9, //
            7, 0, 0, 128, 5, 5,
        ];
        let map = TileMap::from_rgb_components(&pixels, 2, 2, 3).unwrap();
        assert_eq!(map.tile(0, 0), 255);
        assert_eq!(map.tile(1, 0), 0);
        assert_eq!(map.tile(0, 1), 7);
        assert_eq!(map.tile(1, 1), 128);
        assert!(map.is_wall(1, 0));
        assert_eq!(map.grid(), Grid::new(2, 2).unwrap());
    }

    #[test]
    fn test_tile_outside_map_is_wall() {
        let map = TileMap::from_rgb_components(&[9; 4], 2, 2, 1).unwrap();
        assert_eq!(map.tile(-1, 0), 0);
        assert_eq!(map.tile(0, 2), 0);
        assert_eq!(map.tile(2, 1), 0);
        assert_eq!(map.tile(1, 1), 9);
    }

    #[test]
    fn test_short_tile_data_is_rejected() {
        let err = TileMap::from_rgb_components(&[0; 11], 2, 2, 3).unwrap_err();
        assert!(matches!(
            err,
            LodError::TileMapData {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn test_tile_map_from_png() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("map.png");
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([200, 0, 0]));
        img.save(&path).unwrap();

        let map = TileMap::load(&path).unwrap();
        assert_eq!((map.width(), map.height()), (3, 2));
        assert_eq!(map.tile(2, 1), 200);
        assert!(map.is_wall(0, 0));
    }
}
