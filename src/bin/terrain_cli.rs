use std::path::PathBuf;

use clap::Parser;
use rts_terrain_lib::terrain::export::{export_terrain_files, ExportOptions};

/// Resolve tile blends and cliff placements for a decoded terrain grid.
#[derive(Parser, Debug)]
#[command(name = "terrain_cli", version, about)]
struct Args {
    /// Grid JSON produced by the map decoder
    grid: PathBuf,

    /// Directory to write the PNG grids and JSON manifests into
    output_dir: PathBuf,

    /// Asset manifest (extended textures, blight, cliff tilesets)
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Process tiles in parallel
    #[arg(long)]
    parallel: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = ExportOptions {
        parallel: args.parallel,
    };

    log::info!("Exporting terrain from {}", args.grid.display());
    if let Some(assets) = &args.assets {
        log::info!("  Assets: {}", assets.display());
    }
    log::info!("  Output dir: {}", args.output_dir.display());

    match export_terrain_files(
        &args.grid,
        args.assets.as_deref(),
        &args.output_dir,
        &options,
    ) {
        Ok(result) => {
            log::info!("Export complete!");
            log::info!("  Manifest: {}", result.manifest_path);
            log::info!(
                "  Tiles: {} ({} blended)",
                result.total_tiles,
                result.blended_tiles
            );
            log::info!(
                "  Cliffs: {} placements, {} models",
                result.total_cliff_placements,
                result.cliff_models
            );
        }
        Err(e) => {
            log::error!("Export failed: {:?}", e);
            std::process::exit(1);
        }
    }
}
