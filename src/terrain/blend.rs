use serde::{Deserialize, Serialize};

use super::assets::TerrainAssets;
use super::cliff::{is_cliff_tile, normalize_cliff_texture};
use super::grid::TerrainGrid;

pub const TILE_BLEND_SLOTS: usize = 4;

// Corner adjacency bits for overlay slots
pub const MASK_BOTTOM_RIGHT: u8 = 0b0001;
pub const MASK_BOTTOM_LEFT: u8 = 0b0010;
pub const MASK_TOP_RIGHT: u8 = 0b0100;
pub const MASK_TOP_LEFT: u8 = 0b1000;

/// One texture layer of a tile.
///
/// `texture` holds the catalogue index plus one so that 0 means "empty".
/// In slot 0 `code` is the atlas variation code; in slots 1-3 it is the
/// corner adjacency mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendSlot {
    pub texture: u16,
    pub code: u8,
    pub extended: bool,
}

impl BlendSlot {
    pub fn is_empty(&self) -> bool {
        self.texture == 0
    }

    pub fn texture_index(&self) -> Option<u8> {
        self.texture.checked_sub(1).map(|t| t as u8)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileBlendDescriptor {
    pub slots: [BlendSlot; TILE_BLEND_SLOTS],
}

impl TileBlendDescriptor {
    pub const EMPTY: TileBlendDescriptor = TileBlendDescriptor {
        slots: [BlendSlot {
            texture: 0,
            code: 0,
            extended: false,
        }; TILE_BLEND_SLOTS],
    };

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(BlendSlot::is_empty)
    }

    pub fn layer_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

// ============================================================================
// Variation codes
// ============================================================================

/// Map a raw variation seed to an atlas cell.
///
/// Extended atlases put the 16 plain variations in the right half (cells
/// 16-31); seed 16 picks cell 15 and anything higher falls back to cell 0.
/// Narrow atlases only distinguish seed 0 from everything else.
pub fn variation_code(raw_variation: u8, extended: bool) -> u8 {
    if extended {
        match raw_variation {
            v if v < 16 => 16 + v,
            16 => 15,
            _ => 0,
        }
    } else if raw_variation == 0 {
        0
    } else {
        15
    }
}

/// `(column, row)` of a variation code's cell. Extended atlases are 8×4
/// cells with codes 16+ in the right half; narrow atlases are 4×4.
pub fn atlas_cell(code: u8, extended: bool) -> (u8, u8) {
    if extended && code >= 16 {
        let v = code - 16;
        (4 + v % 4, v / 4)
    } else {
        (code % 4, code / 4)
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves which textures paint each tile and how they blend.
#[derive(Clone, Copy)]
pub struct TileBlendResolver<'a> {
    grid: &'a TerrainGrid,
    assets: &'a TerrainAssets,
}

impl<'a> TileBlendResolver<'a> {
    pub fn new(grid: &'a TerrainGrid, assets: &'a TerrainAssets) -> Self {
        Self { grid, assets }
    }

    /// Texture painted at a corner.
    ///
    /// A cliff on any of the (up to) four tiles sharing the corner paints
    /// its ground texture through, taking precedence over blight and the
    /// corner's own ground texture.
    pub fn resolve_corner_texture(&self, column: usize, row: usize) -> u8 {
        for tile_y in [row.checked_sub(1), Some(row)].into_iter().flatten() {
            for tile_x in [column.checked_sub(1), Some(column)].into_iter().flatten() {
                if is_cliff_tile(self.grid, tile_x, tile_y) {
                    let cliff = self.grid.corner(tile_x, tile_y).cliff_texture;
                    return self
                        .assets
                        .cliff_ground_texture(normalize_cliff_texture(cliff));
                }
            }
        }

        let corner = self.grid.corner(column, row);
        if corner.blight {
            self.assets.blight_texture()
        } else {
            corner.ground_texture
        }
    }

    pub fn resolve_variation(&self, texture: u8, raw_variation: u8) -> u8 {
        variation_code(raw_variation, self.assets.is_extended(texture))
    }

    pub fn resolve_tile(&self, x: usize, y: usize) -> TileBlendDescriptor {
        // Cliff tiles are painted by the cliff models instead
        if is_cliff_tile(self.grid, x, y) {
            return TileBlendDescriptor::EMPTY;
        }

        let bottom_left = self.resolve_corner_texture(x, y);
        let bottom_right = self.resolve_corner_texture(x + 1, y);
        let top_left = self.resolve_corner_texture(x, y + 1);
        let top_right = self.resolve_corner_texture(x + 1, y + 1);

        let mut textures = [bottom_left, bottom_right, top_left, top_right];
        textures.sort_unstable();

        let mut descriptor = TileBlendDescriptor::EMPTY;
        let base = textures[0];
        let raw_variation = self.grid.corner(x, y).ground_variation;
        descriptor.slots[0] = BlendSlot {
            texture: base as u16 + 1,
            code: self.resolve_variation(base, raw_variation),
            extended: self.assets.is_extended(base),
        };

        let mut slot = 1;
        let mut previous = base;
        for &texture in &textures[1..] {
            if texture == previous {
                continue;
            }
            previous = texture;

            let mut mask = 0u8;
            if bottom_right == texture {
                mask |= MASK_BOTTOM_RIGHT;
            }
            if bottom_left == texture {
                mask |= MASK_BOTTOM_LEFT;
            }
            if top_right == texture {
                mask |= MASK_TOP_RIGHT;
            }
            if top_left == texture {
                mask |= MASK_TOP_LEFT;
            }

            descriptor.slots[slot] = BlendSlot {
                texture: texture as u16 + 1,
                code: mask,
                extended: self.assets.is_extended(texture),
            };
            slot += 1;
        }

        descriptor
    }

    /// Descriptors for every tile, row-major.
    pub fn resolve_all(&self) -> Vec<TileBlendDescriptor> {
        self.grid
            .tiles()
            .map(|(x, y)| self.resolve_tile(x, y))
            .collect()
    }
}
