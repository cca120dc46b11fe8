use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::{self, TerrainError};

/// Largest tier difference a step code letter can carry ('A' + 25 = 'Z').
pub const MAX_TIER_SPREAD: i32 = 25;

/// One terrain grid vertex, shared by up to four tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corner {
    /// Index into the ground texture catalogue
    pub ground_texture: u8,
    /// Raw variation seed (0-31)
    pub ground_variation: u8,
    /// Index into the cliff tileset catalogue (15 is a legacy alias for 1)
    pub cliff_texture: u8,
    pub cliff_variation: u8,
    /// Discrete height step, not a continuous height
    pub elevation_tier: i16,
    #[serde(default)]
    pub blight: bool,
}

/// The four corners bounding a tile. Row 0 is the bottom row of the grid,
/// so "top" corners live at `row + 1`.
#[derive(Debug, Clone, Copy)]
pub struct TileCorners<'a> {
    pub bottom_left: &'a Corner,
    pub bottom_right: &'a Corner,
    pub top_left: &'a Corner,
    pub top_right: &'a Corner,
}

impl TileCorners<'_> {
    /// Elevation tiers in step code order: BL, TL, TR, BR.
    pub fn tiers(&self) -> [i16; 4] {
        [
            self.bottom_left.elevation_tier,
            self.top_left.elevation_tier,
            self.top_right.elevation_tier,
            self.bottom_right.elevation_tier,
        ]
    }

    pub fn is_flat(&self) -> bool {
        let [bl, tl, tr, br] = self.tiers();
        bl == tl && bl == tr && bl == br
    }
}

/// Immutable, row-major `width × height` grid of terrain corners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    corners: Vec<Corner>,
}

impl TerrainGrid {
    /// Build a grid, panicking on a malformed corner array.
    ///
    /// An undersized array or an unencodable tier spread is a caller bug;
    /// use [`TerrainGrid::try_new`] for data that has not been validated.
    pub fn new(width: usize, height: usize, corners: Vec<Corner>) -> Self {
        match Self::try_new(width, height, corners) {
            Ok(grid) => grid,
            Err(e) => panic!("invalid terrain grid: {}", e),
        }
    }

    pub fn try_new(width: usize, height: usize, corners: Vec<Corner>) -> error::Result<Self> {
        // Untrusted dimensions may overflow usize
        if width.checked_mul(height) != Some(corners.len()) {
            return Err(TerrainError::GridSizeMismatch {
                width,
                height,
                corners: corners.len(),
            });
        }

        let grid = Self {
            width,
            height,
            corners,
        };

        // Only interior tiles can become cliffs, so only they need an
        // encodable spread.
        for (x, y) in grid.tiles() {
            if grid.is_boundary_tile(x, y) {
                continue;
            }
            let tiers = grid.tile_corners(x, y).tiers();
            let min = tiers.iter().copied().min().unwrap_or(0) as i32;
            let max = tiers.iter().copied().max().unwrap_or(0) as i32;
            if max - min > MAX_TIER_SPREAD {
                return Err(TerrainError::TierSpreadOutOfRange {
                    x,
                    y,
                    spread: max - min,
                });
            }
        }

        Ok(grid)
    }

    /// Grid where every corner is a copy of `corner`.
    pub fn filled(width: usize, height: usize, corner: Corner) -> Self {
        Self::new(width, height, vec![corner; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn tile_columns(&self) -> usize {
        self.width.saturating_sub(1)
    }

    pub fn tile_rows(&self) -> usize {
        self.height.saturating_sub(1)
    }

    pub fn tile_count(&self) -> usize {
        self.tile_columns() * self.tile_rows()
    }

    pub fn corner(&self, column: usize, row: usize) -> &Corner {
        assert!(
            column < self.width && row < self.height,
            "corner ({}, {}) outside {}x{} grid",
            column,
            row,
            self.width,
            self.height
        );
        &self.corners[row * self.width + column]
    }

    pub fn tile_corners(&self, x: usize, y: usize) -> TileCorners<'_> {
        TileCorners {
            bottom_left: self.corner(x, y),
            bottom_right: self.corner(x + 1, y),
            top_left: self.corner(x, y + 1),
            top_right: self.corner(x + 1, y + 1),
        }
    }

    /// Tiles touching the outer ring of corners are never cliffs.
    pub fn is_boundary_tile(&self, x: usize, y: usize) -> bool {
        x < 1 || y < 1 || x + 2 >= self.width || y + 2 >= self.height
    }

    /// Tile coordinates in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let columns = self.tile_columns();
        (0..self.tile_rows()).flat_map(move |y| (0..columns).map(move |x| (x, y)))
    }

    /// Row-major tile index to `(x, y)`.
    pub fn tile_coords(&self, index: usize) -> (usize, usize) {
        let columns = self.tile_columns();
        (index % columns, index / columns)
    }
}

// ============================================================================
// Grid document (JSON interchange with the map decoder)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GridDocument {
    pub width: usize,
    pub height: usize,
    pub corners: Vec<Corner>,
}

impl TryFrom<GridDocument> for TerrainGrid {
    type Error = TerrainError;

    fn try_from(doc: GridDocument) -> error::Result<Self> {
        TerrainGrid::try_new(doc.width, doc.height, doc.corners)
    }
}

impl From<&TerrainGrid> for GridDocument {
    fn from(grid: &TerrainGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            corners: grid.corners.clone(),
        }
    }
}

pub fn parse_grid_json(data: &str) -> Result<TerrainGrid> {
    let doc: GridDocument = serde_json::from_str(data).context("Failed to parse grid JSON")?;
    let grid = TerrainGrid::try_from(doc)?;
    Ok(grid)
}

/// Load a decoded terrain grid from a JSON document on disk.
pub fn load_grid_json(path: &Path) -> Result<TerrainGrid> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid file: {}", path.display()))?;
    parse_grid_json(&data).with_context(|| format!("Invalid grid file: {}", path.display()))
}
