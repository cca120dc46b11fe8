use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::assets::TerrainAssets;
use super::error::{self, TerrainError};
use super::grid::{TerrainGrid, MAX_TIER_SPREAD};

/// Cliff texture 15 is a legacy alias for tileset 1.
pub const CLIFF_TEXTURE_ALIAS: u8 = 15;

pub fn normalize_cliff_texture(texture: u8) -> u8 {
    if texture == CLIFF_TEXTURE_ALIAS {
        1
    } else {
        texture
    }
}

/// A tile is a cliff when it is not on the grid's outer ring and its four
/// corners do not all share one elevation tier.
pub fn is_cliff_tile(grid: &TerrainGrid, x: usize, y: usize) -> bool {
    if grid.is_boundary_tile(x, y) {
        return false;
    }
    !grid.tile_corners(x, y).is_flat()
}

// ============================================================================
// Step codes
// ============================================================================

/// Four-letter encoding of a cliff tile's corner tiers relative to the
/// lowest one, in BottomLeft, TopLeft, TopRight, BottomRight order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepCode([u8; 4]);

impl StepCode {
    pub const FLAT: StepCode = StepCode(*b"AAAA");

    /// Encode tiers given in BL, TL, TR, BR order.
    ///
    /// # Panics
    ///
    /// Panics when two tiers are more than 25 steps apart. Grids built with
    /// [`TerrainGrid::try_new`] never contain such a cliff tile.
    pub fn from_tiers(tiers: [i16; 4]) -> Self {
        match Self::try_from_tiers(tiers) {
            Ok(code) => code,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_from_tiers(tiers: [i16; 4]) -> error::Result<Self> {
        let base = tiers.iter().copied().min().unwrap_or(0) as i32;
        let mut letters = [b'A'; 4];
        for (letter, &tier) in letters.iter_mut().zip(tiers.iter()) {
            let step = tier as i32 - base;
            if step > MAX_TIER_SPREAD {
                return Err(TerrainError::StepOutOfRange { tiers });
            }
            *letter = b'A' + step as u8;
        }
        Ok(StepCode(letters))
    }

    pub fn letters(&self) -> [u8; 4] {
        self.0
    }

    pub fn is_flat(&self) -> bool {
        *self == Self::FLAT
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("step code letters are ASCII uppercase")
    }
}

impl FromStr for StepCode {
    type Err = TerrainError;

    fn from_str(s: &str) -> error::Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(TerrainError::InvalidStepCode(s.to_string()));
        }
        Ok(StepCode([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl fmt::Display for StepCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for StepCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StepCode({})", self.as_str())
    }
}

impl Serialize for StepCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Placements
// ============================================================================

pub const DEFAULT_CLIFF_MODEL_DIR: &str = "Cliffs";

/// One cliff model to place on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliffPlacement {
    pub x: usize,
    pub y: usize,
    /// Lowest elevation tier among the tile's corners
    pub base_tier: i16,
    pub step_code: StepCode,
    /// Cliff tileset index of the bottom-left corner, alias 15 normalized
    pub texture_index: u8,
    /// Requested variation clamped to the variants the model family ships
    pub variation: u8,
}

impl CliffPlacement {
    /// Model name without directory or extension, e.g. `CliffsAABA1`.
    pub fn model_name(&self, model_dir: &str) -> String {
        format!("{}{}{}", model_dir, self.step_code, self.variation)
    }

    /// Archive path of the model, e.g. `Doodads\Terrain\Cliffs\CliffsAABA1.mdx`.
    pub fn model_path(&self, model_dir: &str) -> String {
        format!(
            "Doodads\\Terrain\\{}\\{}.mdx",
            model_dir,
            self.model_name(model_dir)
        )
    }
}

/// Instance data for one placement of a shared cliff model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliffInstance {
    pub x: usize,
    pub y: usize,
    pub base_tier: i16,
}

/// Group placements by model path so the renderer can instance each model.
pub fn group_by_model(
    placements: &[CliffPlacement],
    assets: &TerrainAssets,
) -> BTreeMap<String, Vec<CliffInstance>> {
    let mut groups: BTreeMap<String, Vec<CliffInstance>> = BTreeMap::new();
    for placement in placements {
        let dir = assets
            .cliff_model_dir(placement.texture_index)
            .unwrap_or(DEFAULT_CLIFF_MODEL_DIR);
        groups
            .entry(placement.model_path(dir))
            .or_default()
            .push(CliffInstance {
                x: placement.x,
                y: placement.y,
                base_tier: placement.base_tier,
            });
    }
    groups
}

// ============================================================================
// Synthesizer
// ============================================================================

/// Detects cliff tiles and derives the model placement for each.
#[derive(Clone, Copy)]
pub struct CliffSynthesizer<'a> {
    grid: &'a TerrainGrid,
    assets: &'a TerrainAssets,
}

impl<'a> CliffSynthesizer<'a> {
    pub fn new(grid: &'a TerrainGrid, assets: &'a TerrainAssets) -> Self {
        Self { grid, assets }
    }

    pub fn is_cliff_tile(&self, x: usize, y: usize) -> bool {
        is_cliff_tile(self.grid, x, y)
    }

    /// Placement for tile `(x, y)`, or None if the tile is not a cliff.
    pub fn placement_at(&self, x: usize, y: usize) -> Option<CliffPlacement> {
        if !self.is_cliff_tile(x, y) {
            return None;
        }

        let corners = self.grid.tile_corners(x, y);
        let tiers = corners.tiers();
        let step_code = StepCode::from_tiers(tiers);
        if step_code.is_flat() {
            return None;
        }

        let bottom_left = corners.bottom_left;
        let texture_index = normalize_cliff_texture(bottom_left.cliff_texture);
        let family = self.assets.cliff_family(texture_index);
        let variation =
            self.assets
                .cliff_variations()
                .clamp(family, step_code, bottom_left.cliff_variation);

        Some(CliffPlacement {
            x,
            y,
            base_tier: tiers.iter().copied().min().unwrap_or(0),
            step_code,
            texture_index,
            variation,
        })
    }

    /// Lazily walks the grid row-major. Each call starts a fresh pass.
    pub fn placements(&self) -> impl Iterator<Item = CliffPlacement> + 'a {
        let synth = *self;
        let grid: &'a TerrainGrid = self.grid;
        grid.tiles()
            .filter_map(move |(x, y)| synth.placement_at(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::grid::Corner;
    use crate::terrain::variations::CliffVariationTable;

    fn corner(tier: i16) -> Corner {
        Corner {
            elevation_tier: tier,
            ..Corner::default()
        }
    }

    /// 4x4 grid whose only interior tile (1, 1) has the given BL, TL, TR, BR tiers.
    fn single_interior(tiers: [i16; 4], cliff_texture: u8, cliff_variation: u8) -> TerrainGrid {
        let mut corners = vec![corner(tiers[0]); 16];
        let [bl, tl, tr, br] = tiers;
        corners[1 * 4 + 1] = Corner {
            cliff_texture,
            cliff_variation,
            ..corner(bl)
        };
        corners[2 * 4 + 1] = corner(tl);
        corners[2 * 4 + 2] = corner(tr);
        corners[1 * 4 + 2] = corner(br);
        TerrainGrid::new(4, 4, corners)
    }

    #[test]
    fn step_code_letters_are_relative_to_base() {
        assert_eq!(StepCode::from_tiers([2, 2, 3, 2]).as_str(), "AABA");
        assert_eq!(StepCode::from_tiers([-1, 0, 1, -1]).as_str(), "ABCA");
        assert_eq!(StepCode::from_tiers([5, 5, 5, 5]), StepCode::FLAT);
        assert_eq!(StepCode::from_tiers([0, 25, 0, 0]).as_str(), "AZAA");
    }

    #[test]
    fn step_code_past_z_fails() {
        let err = StepCode::try_from_tiers([0, 26, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            TerrainError::StepOutOfRange {
                tiers: [0, 26, 0, 0]
            }
        );
    }

    #[test]
    #[should_panic(expected = "cannot be encoded")]
    fn from_tiers_panics_past_z() {
        StepCode::from_tiers([i16::MIN, i16::MAX, 0, 0]);
    }

    #[test]
    fn every_encodable_step_reads_back_as_letters() {
        for step in 0..=MAX_TIER_SPREAD as i16 {
            let code = StepCode::from_tiers([0, step, 0, 0]);
            let text = code.as_str();
            assert_eq!(text.len(), 4);
            assert_eq!(text.as_bytes(), &code.letters());
            assert_eq!(text.parse::<StepCode>().unwrap(), code);
        }
    }

    #[test]
    fn step_code_parse_and_display() {
        let code: StepCode = "ABBA".parse().unwrap();
        assert_eq!(code.to_string(), "ABBA");
        assert_eq!(format!("{:?}", code), "StepCode(ABBA)");
        assert!("abba".parse::<StepCode>().is_err());
        assert!("ABB".parse::<StepCode>().is_err());
        assert!("ABBA1".parse::<StepCode>().is_err());
    }

    #[test]
    fn step_code_serializes_as_string() {
        let code: StepCode = "AABA".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"AABA\"");
        let back: StepCode = serde_json::from_str("\"AABA\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<StepCode>("\"AA\"").is_err());
    }

    #[test]
    fn normalizes_alias_texture() {
        assert_eq!(normalize_cliff_texture(15), 1);
        assert_eq!(normalize_cliff_texture(0), 0);
        assert_eq!(normalize_cliff_texture(1), 1);
        assert_eq!(normalize_cliff_texture(14), 14);
    }

    #[test]
    fn interior_tier_mismatch_is_cliff() {
        let grid = single_interior([2, 2, 3, 2], 0, 0);
        assert!(is_cliff_tile(&grid, 1, 1));
        assert!(!is_cliff_tile(&grid, 0, 0));
        assert!(!is_cliff_tile(&grid, 2, 2));
    }

    #[test]
    fn out_of_range_tiles_are_not_cliffs() {
        let grid = single_interior([2, 2, 3, 2], 0, 0);
        assert!(!is_cliff_tile(&grid, 10, 1));
        assert!(!is_cliff_tile(&grid, 1, 10));
    }

    #[test]
    fn placement_for_aaba_tile() {
        let grid = single_interior([2, 2, 3, 2], 15, 3);
        let assets = TerrainAssets::default();
        let synth = CliffSynthesizer::new(&grid, &assets);

        let placement = synth.placement_at(1, 1).expect("cliff placement");
        assert_eq!(placement.base_tier, 2);
        assert_eq!(placement.step_code.as_str(), "AABA");
        assert_eq!(placement.texture_index, 1);
        // Standard family ships AABA0 and AABA1
        assert_eq!(placement.variation, 1);
    }

    #[test]
    fn variation_clamps_to_zero_without_table_entry() {
        let grid = single_interior([2, 2, 3, 2], 0, 3);
        let assets = TerrainAssets::default().with_cliff_variations(CliffVariationTable::empty());
        let synth = CliffSynthesizer::new(&grid, &assets);
        assert_eq!(synth.placement_at(1, 1).unwrap().variation, 0);
    }

    #[test]
    fn city_family_selected_by_model_dir() {
        let grid = single_interior([0, 0, 0, 1], 2, 5);
        let assets = TerrainAssets::default().with_cliff_tileset(2, "CityCliffs", None);
        let synth = CliffSynthesizer::new(&grid, &assets);
        let placement = synth.placement_at(1, 1).unwrap();
        assert_eq!(placement.step_code.as_str(), "AAAB");
        assert_eq!(placement.variation, 2);
        assert_eq!(
            placement.model_path("CityCliffs"),
            "Doodads\\Terrain\\CityCliffs\\CityCliffsAAAB2.mdx"
        );
    }

    #[test]
    fn placements_are_restartable() {
        let grid = single_interior([2, 2, 3, 2], 0, 0);
        let assets = TerrainAssets::default();
        let synth = CliffSynthesizer::new(&grid, &assets);
        let first: Vec<_> = synth.placements().collect();
        let second: Vec<_> = synth.placements().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn group_by_model_uses_default_dir() {
        let grid = single_interior([2, 2, 3, 2], 0, 0);
        let assets = TerrainAssets::default();
        let placements: Vec<_> = CliffSynthesizer::new(&grid, &assets).placements().collect();
        let groups = group_by_model(&placements, &assets);
        let instances = &groups["Doodads\\Terrain\\Cliffs\\CliffsAABA0.mdx"];
        assert_eq!(
            instances,
            &vec![CliffInstance {
                x: 1,
                y: 1,
                base_tier: 2
            }]
        );
    }
}
