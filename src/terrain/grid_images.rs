//! Grid-to-PNG image encoding for the renderer hand-off.
//!
//! Images are written row by row in grid order: pixel row 0 holds grid
//! row 0 (the bottom of the map).

use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

use super::blend::TileBlendDescriptor;
use super::grid::TerrainGrid;

pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Tile blend descriptors as three images, one pixel per tile:
/// - texture image: RGBA16, channel i = slot i texture (index + 1, 0 = empty)
/// - code image: RGBA8, channel i = slot i variation code (slot 0) or corner mask
/// - extended image: L8, bit i set when slot i uses the extended atlas layout
pub fn blend_images(
    blends: &[TileBlendDescriptor],
    columns: usize,
    rows: usize,
) -> (Rgba16Image, RgbaImage, GrayImage) {
    let (w, h) = (columns as u32, rows as u32);
    let mut tex_img = Rgba16Image::new(w, h);
    let mut code_img = RgbaImage::new(w, h);
    let mut ext_img = GrayImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let d = &blends[(y * w + x) as usize];
            let s = &d.slots;
            tex_img.put_pixel(
                x,
                y,
                Rgba([s[0].texture, s[1].texture, s[2].texture, s[3].texture]),
            );
            code_img.put_pixel(x, y, Rgba([s[0].code, s[1].code, s[2].code, s[3].code]));

            let mut bits = 0u8;
            for (i, slot) in s.iter().enumerate() {
                if slot.extended {
                    bits |= 1 << i;
                }
            }
            ext_img.put_pixel(x, y, image::Luma([bits]));
        }
    }

    (tex_img, code_img, ext_img)
}

pub fn encode_blend_pngs(
    blends: &[TileBlendDescriptor],
    columns: usize,
    rows: usize,
    tex_path: &Path,
    code_path: &Path,
    extended_path: &Path,
) -> Result<()> {
    anyhow::ensure!(
        blends.len() == columns * rows,
        "Blend grid has {} tiles, expected {}x{}",
        blends.len(),
        columns,
        rows
    );

    let (tex_img, code_img, ext_img) = blend_images(blends, columns, rows);

    tex_img
        .save(tex_path)
        .with_context(|| format!("Failed to write blend texture PNG: {}", tex_path.display()))?;
    code_img
        .save(code_path)
        .with_context(|| format!("Failed to write blend code PNG: {}", code_path.display()))?;
    ext_img.save(extended_path).with_context(|| {
        format!(
            "Failed to write blend extended PNG: {}",
            extended_path.display()
        )
    })
}

/// Encode corner elevation tiers as an RGB8 PNG, one pixel per corner.
/// i16 → unsigned offset +32768 → R=low byte, G=high byte, B=0.
pub fn encode_tier_png(grid: &TerrainGrid, path: &Path) -> Result<()> {
    let (w, h) = (grid.width() as u32, grid.height() as u32);
    let mut img = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let tier = grid.corner(x as usize, y as usize).elevation_tier;
            let u16_val = (tier as i32 + 32768) as u16;
            let r = (u16_val & 0xFF) as u8;
            let g = (u16_val >> 8) as u8;
            img.put_pixel(x, y, Rgb([r, g, 0]));
        }
    }
    img.save(path)
        .with_context(|| format!("Failed to write tier PNG: {}", path.display()))
}

/// Inverse of the tier encoding, for consumers reading the PNG back.
pub fn decode_tier_pixel(pixel: [u8; 3]) -> i16 {
    let u16_val = u16::from_le_bytes([pixel[0], pixel[1]]);
    (u16_val as i32 - 32768) as i16
}
