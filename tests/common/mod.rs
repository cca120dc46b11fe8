// Common test utilities and helpers
#![allow(dead_code)]

use rts_terrain_lib::terrain::{Corner, TerrainGrid};

/// Builds small grids corner by corner. Coordinates are (column, row) with
/// row 0 at the bottom.
pub struct GridBuilder {
    width: usize,
    height: usize,
    corners: Vec<Corner>,
}

impl GridBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            corners: vec![Corner::default(); width * height],
        }
    }

    pub fn fill(mut self, corner: Corner) -> Self {
        self.corners.iter_mut().for_each(|c| *c = corner);
        self
    }

    pub fn with<F: FnOnce(&mut Corner)>(mut self, column: usize, row: usize, f: F) -> Self {
        f(&mut self.corners[row * self.width + column]);
        self
    }

    pub fn tier(self, column: usize, row: usize, tier: i16) -> Self {
        self.with(column, row, |c| c.elevation_tier = tier)
    }

    pub fn ground(self, column: usize, row: usize, texture: u8) -> Self {
        self.with(column, row, |c| c.ground_texture = texture)
    }

    pub fn build(self) -> TerrainGrid {
        TerrainGrid::new(self.width, self.height, self.corners)
    }
}

/// Deterministic pseudo-random grid (LCG) with tiers 0..=2, ground textures
/// 0..=5, a sprinkle of blight and cliff textures including the 15 alias.
pub fn scrambled_grid(width: usize, height: usize, seed: u64) -> TerrainGrid {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };

    let corners = (0..width * height)
        .map(|_| Corner {
            ground_texture: (next() % 6) as u8,
            ground_variation: (next() % 32) as u8,
            cliff_texture: [0u8, 1, 15][(next() % 3) as usize],
            cliff_variation: (next() % 4) as u8,
            elevation_tier: (next() % 3) as i16,
            blight: next() % 10 == 0,
        })
        .collect();

    TerrainGrid::new(width, height, corners)
}
