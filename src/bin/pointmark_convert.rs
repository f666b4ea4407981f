//! Convert a `points2D.txt` log into per-camera keypoint JSON files.

use std::path::PathBuf;

use clap::Parser;
use pointmark::convert::{GridLayout, LabelMap, PlanarLayout, convert_points};

/// Write `<out_dir>/<camera>/000000.json` for every image in a points log.
///
/// Cameras are numbered from 1 in the order images first appear in the log.
/// Images without any point are not in the log, so later cameras shift down.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
struct Args {
    /// points2D.txt written by the annotation window
    points_file: PathBuf,

    /// Output directory; must not exist yet
    out_dir: PathBuf,

    /// Checkerboard tile size used by the default numbered grid
    #[arg(long, default_value_t = GridLayout::default().tile_len)]
    tile_len: f64,

    /// JSON file mapping each label to its [x, y] target position,
    /// replacing the numbered grid
    #[arg(long)]
    layout: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> pointmark::Result<()> {
    let args = Args::parse();

    let layout: Box<dyn PlanarLayout> = match &args.layout {
        Some(path) => Box::new(LabelMap::load(path)?),
        None => Box::new(GridLayout::default().with_tile_len(args.tile_len)),
    };

    let outputs = convert_points(&args.points_file, &args.out_dir, layout.as_ref())?;
    for output in &outputs {
        println!("{} -> camera {}", output.img_name, output.camera);
    }
    log::info!("Wrote {} camera files to {:?}", outputs.len(), args.out_dir);
    Ok(())
}
