pub mod assets;
pub mod blend;
pub mod cliff;
pub mod error;
pub mod export;
pub mod grid;
pub mod grid_images;
pub mod variations;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use assets::TerrainAssets;
pub use blend::{BlendSlot, TileBlendDescriptor, TileBlendResolver};
pub use cliff::{CliffPlacement, CliffSynthesizer, StepCode};
pub use error::TerrainError;
pub use grid::{Corner, TerrainGrid};
pub use variations::{CliffFamily, CliffVariationTable};

/// Output of one synthesis pass over a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSynthesis {
    /// One descriptor per tile, row-major
    pub blends: Vec<TileBlendDescriptor>,
    /// Cliff tiles in row-major order
    pub cliffs: Vec<CliffPlacement>,
}

impl TerrainSynthesis {
    pub fn blended_tiles(&self) -> usize {
        self.blends.iter().filter(|d| !d.is_empty()).count()
    }
}

/// Resolve blends and cliffs for every tile on the calling thread.
pub fn synthesize(grid: &TerrainGrid, assets: &TerrainAssets) -> TerrainSynthesis {
    let blends = TileBlendResolver::new(grid, assets).resolve_all();
    let cliffs: Vec<_> = CliffSynthesizer::new(grid, assets).placements().collect();

    log::debug!(
        "Synthesized {}x{} grid: {} tiles, {} cliffs",
        grid.width(),
        grid.height(),
        blends.len(),
        cliffs.len()
    );

    TerrainSynthesis { blends, cliffs }
}

/// Same result as [`synthesize`], with tiles spread across the rayon pool.
pub fn synthesize_par(grid: &TerrainGrid, assets: &TerrainAssets) -> TerrainSynthesis {
    let resolver = TileBlendResolver::new(grid, assets);
    let synth = CliffSynthesizer::new(grid, assets);
    let tile_count = grid.tile_count();

    let blends: Vec<_> = (0..tile_count)
        .into_par_iter()
        .map(|i| {
            let (x, y) = grid.tile_coords(i);
            resolver.resolve_tile(x, y)
        })
        .collect();

    let cliffs: Vec<_> = (0..tile_count)
        .into_par_iter()
        .filter_map(|i| {
            let (x, y) = grid.tile_coords(i);
            synth.placement_at(x, y)
        })
        .collect();

    log::debug!(
        "Synthesized {}x{} grid in parallel: {} tiles, {} cliffs",
        grid.width(),
        grid.height(),
        blends.len(),
        cliffs.len()
    );

    TerrainSynthesis { blends, cliffs }
}
