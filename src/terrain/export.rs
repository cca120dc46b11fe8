use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::assets::{load_asset_manifest, TerrainAssets};
use super::cliff::{group_by_model, CliffInstance};
use super::grid::{load_grid_json, TerrainGrid};
use super::grid_images::{encode_blend_pngs, encode_tier_png};
use super::{synthesize, synthesize_par, TerrainSynthesis};

pub const BLEND_TEX_FILE: &str = "tile_blend_tex.png";
pub const BLEND_CODE_FILE: &str = "tile_blend_code.png";
pub const BLEND_EXTENDED_FILE: &str = "tile_blend_extended.png";
pub const TIER_FILE: &str = "corner_tiers.png";
pub const CLIFFS_FILE: &str = "cliffs.json";
pub const MANIFEST_FILE: &str = "terrain_manifest.json";

/// Options controlling the terrain export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Spread tiles across the rayon pool. Output is identical either way.
    pub parallel: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TerrainExportResult {
    pub output_dir: String,
    pub manifest_path: String,
    pub cliffs_path: String,
    pub total_tiles: u32,
    pub blended_tiles: u32,
    pub total_cliff_placements: u32,
    pub cliff_models: u32,
}

/// cliffs.json layout: model path → instances.
#[derive(Debug, Serialize, Deserialize)]
pub struct CliffManifest {
    pub models: BTreeMap<String, Vec<CliffInstance>>,
}

pub fn export_terrain(
    grid: &TerrainGrid,
    assets: &TerrainAssets,
    output_dir: &Path,
    options: &ExportOptions,
) -> Result<TerrainExportResult> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

    let synthesis = if options.parallel {
        synthesize_par(grid, assets)
    } else {
        synthesize(grid, assets)
    };

    write_synthesis(grid, assets, &synthesis, output_dir)
}

fn write_synthesis(
    grid: &TerrainGrid,
    assets: &TerrainAssets,
    synthesis: &TerrainSynthesis,
    output_dir: &Path,
) -> Result<TerrainExportResult> {
    // Zero-sized PNGs cannot be written; the manifest lists skipped images as null
    let blend_files = if grid.tile_count() > 0 {
        encode_blend_pngs(
            &synthesis.blends,
            grid.tile_columns(),
            grid.tile_rows(),
            &output_dir.join(BLEND_TEX_FILE),
            &output_dir.join(BLEND_CODE_FILE),
            &output_dir.join(BLEND_EXTENDED_FILE),
        )?;
        serde_json::json!({
            "texture": BLEND_TEX_FILE,
            "code": BLEND_CODE_FILE,
            "extended": BLEND_EXTENDED_FILE,
        })
    } else {
        log::warn!(
            "{}x{} grid has no tiles, skipping blend images",
            grid.width(),
            grid.height()
        );
        serde_json::Value::Null
    };

    let tier_file = if grid.corners().is_empty() {
        serde_json::Value::Null
    } else {
        encode_tier_png(grid, &output_dir.join(TIER_FILE))?;
        serde_json::json!(TIER_FILE)
    };

    let cliff_manifest = CliffManifest {
        models: group_by_model(&synthesis.cliffs, assets),
    };
    let cliffs_path = output_dir.join(CLIFFS_FILE);
    let cliffs_json = serde_json::to_string_pretty(&cliff_manifest)?;
    std::fs::write(&cliffs_path, cliffs_json)
        .with_context(|| format!("Failed to write {}", cliffs_path.display()))?;

    let blended_tiles = synthesis.blended_tiles();
    let manifest = serde_json::json!({
        "version": 1,
        "width": grid.width(),
        "height": grid.height(),
        "tile_columns": grid.tile_columns(),
        "tile_rows": grid.tile_rows(),
        "blend": blend_files,
        "tiers": tier_file,
        "cliffs": CLIFFS_FILE,
        "blended_tiles": blended_tiles,
        "cliff_placements": synthesis.cliffs.len(),
    });
    let manifest_path = output_dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    log::info!(
        "Exported terrain to {}: {} tiles ({} blended), {} cliffs across {} models",
        output_dir.display(),
        synthesis.blends.len(),
        blended_tiles,
        synthesis.cliffs.len(),
        cliff_manifest.models.len()
    );

    Ok(TerrainExportResult {
        output_dir: output_dir.to_string_lossy().to_string(),
        manifest_path: manifest_path.to_string_lossy().to_string(),
        cliffs_path: cliffs_path.to_string_lossy().to_string(),
        total_tiles: synthesis.blends.len() as u32,
        blended_tiles: blended_tiles as u32,
        total_cliff_placements: synthesis.cliffs.len() as u32,
        cliff_models: cliff_manifest.models.len() as u32,
    })
}

/// Load a grid and (optionally) an asset manifest from disk and export.
pub fn export_terrain_files(
    grid_path: &Path,
    assets_path: Option<&Path>,
    output_dir: &Path,
    options: &ExportOptions,
) -> Result<TerrainExportResult> {
    let grid = load_grid_json(grid_path)?;
    let assets = match assets_path {
        Some(path) => load_asset_manifest(path)?,
        None => TerrainAssets::default(),
    };
    export_terrain(&grid, &assets, output_dir, options)
}
