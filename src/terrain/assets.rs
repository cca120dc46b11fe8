//! Texture and cliff model catalogue consumed by the resolvers.
//!
//! Everything the resolvers need to know about the asset set is passed in
//! explicitly through [`TerrainAssets`]. Missing entries degrade to the
//! legacy defaults: narrow atlas layout, identity cliff-to-ground mapping,
//! standard cliff family.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cliff::StepCode;
use super::variations::{CliffFamily, CliffVariationTable};

#[derive(Debug, Clone, Default)]
pub struct TerrainAssets {
    extended: HashMap<u8, bool>,
    blight_texture: u8,
    cliff_ground_textures: HashMap<u8, u8>,
    cliff_model_dirs: HashMap<u8, String>,
    cliff_variations: CliffVariationTable,
}

impl TerrainAssets {
    pub fn with_extended(mut self, texture: u8, extended: bool) -> Self {
        self.extended.insert(texture, extended);
        self
    }

    pub fn with_blight_texture(mut self, texture: u8) -> Self {
        self.blight_texture = texture;
        self
    }

    /// Register cliff tileset `id`. `ground_texture` is the ground texture
    /// the cliff paints onto neighbouring corners (defaults to `id`).
    pub fn with_cliff_tileset(mut self, id: u8, model_dir: &str, ground_texture: Option<u8>) -> Self {
        self.cliff_model_dirs.insert(id, model_dir.to_string());
        if let Some(ground) = ground_texture {
            self.cliff_ground_textures.insert(id, ground);
        }
        self
    }

    pub fn with_cliff_variations(mut self, table: CliffVariationTable) -> Self {
        self.cliff_variations = table;
        self
    }

    /// Whether the texture uses the wide (8×4 cell) atlas layout.
    pub fn is_extended(&self, texture: u8) -> bool {
        self.extended.get(&texture).copied().unwrap_or(false)
    }

    pub fn blight_texture(&self) -> u8 {
        self.blight_texture
    }

    pub fn cliff_ground_texture(&self, cliff_texture: u8) -> u8 {
        self.cliff_ground_textures
            .get(&cliff_texture)
            .copied()
            .unwrap_or(cliff_texture)
    }

    pub fn cliff_model_dir(&self, cliff_texture: u8) -> Option<&str> {
        self.cliff_model_dirs.get(&cliff_texture).map(String::as_str)
    }

    pub fn cliff_family(&self, cliff_texture: u8) -> CliffFamily {
        self.cliff_model_dir(cliff_texture)
            .map(CliffFamily::from_model_dir)
            .unwrap_or(CliffFamily::Standard)
    }

    pub fn cliff_variations(&self) -> &CliffVariationTable {
        &self.cliff_variations
    }

    pub fn from_manifest(manifest: &AssetManifest) -> Result<Self> {
        let mut assets = TerrainAssets::default().with_blight_texture(manifest.blight_texture);

        for entry in &manifest.ground_textures {
            assets.extended.insert(entry.id, entry.extended);
        }

        for tileset in &manifest.cliff_tilesets {
            assets = assets.with_cliff_tileset(tileset.id, &tileset.model_dir, tileset.ground_texture);
        }

        for (family_name, overrides) in &manifest.cliff_variations {
            let family = match CliffFamily::from_name(family_name) {
                Some(family) => family,
                None => {
                    log::warn!("Ignoring variations for unknown cliff family '{}'", family_name);
                    continue;
                }
            };
            for (code_text, &max_variation) in overrides {
                let code: StepCode = code_text
                    .parse()
                    .with_context(|| format!("Bad step code in '{}' variations", family_name))?;
                if !assets.cliff_variations.set(family, code, max_variation) {
                    log::warn!(
                        "Ignoring {} variation override for {}: only A..C steps have models",
                        family_name,
                        code
                    );
                }
            }
        }

        log::debug!(
            "Loaded assets: {} ground textures, {} cliff tilesets, blight texture {}",
            manifest.ground_textures.len(),
            manifest.cliff_tilesets.len(),
            manifest.blight_texture
        );

        Ok(assets)
    }
}

// ============================================================================
// Manifest file
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GroundTextureEntry {
    pub id: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CliffTilesetEntry {
    pub id: u8,
    pub model_dir: String,
    #[serde(default)]
    pub ground_texture: Option<u8>,
}

/// On-disk asset manifest, produced alongside the texture atlases.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AssetManifest {
    #[serde(default)]
    pub ground_textures: Vec<GroundTextureEntry>,
    #[serde(default)]
    pub blight_texture: u8,
    #[serde(default)]
    pub cliff_tilesets: Vec<CliffTilesetEntry>,
    /// Family name ("city" / "standard") → step code → max variation.
    /// Listed codes replace the built-in values; the rest are kept.
    #[serde(default)]
    pub cliff_variations: BTreeMap<String, BTreeMap<String, u8>>,
}

pub fn parse_asset_manifest(data: &str) -> Result<TerrainAssets> {
    let manifest: AssetManifest =
        serde_json::from_str(data).context("Failed to parse asset manifest JSON")?;
    TerrainAssets::from_manifest(&manifest)
}

pub fn load_asset_manifest(path: &Path) -> Result<TerrainAssets> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read asset manifest: {}", path.display()))?;
    parse_asset_manifest(&data)
        .with_context(|| format!("Invalid asset manifest: {}", path.display()))
}
