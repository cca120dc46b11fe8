//! Tile texture-blend and cliff synthesis for RTS terrain grids.

pub mod terrain;
