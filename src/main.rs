//! Interactive annotation window.

use std::path::PathBuf;

use clap::Parser;
use pointmark::constants::DEFAULT_OUTDIR;
use pointmark::{AnnotatorConfig, Annotator, LabelInput, LogLevel};

/// Click labelled keypoints on every image of a directory.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory with the images to annotate (.jpg, .jpeg, .png)
    imgs_dir: PathBuf,

    /// Where points2D.txt and annotated_imgs/ are written
    #[arg(long, default_value = DEFAULT_OUTDIR)]
    outdir: PathBuf,
}

fn main() {
    let args = Args::parse();

    // The logger must exist before the config is read so config warnings show up
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace")).init();
    let config = AnnotatorConfig::load_or_default();
    if let Some(level) = configured_max_level(std::env::var("RUST_LOG").ok().as_deref(), config.log_level) {
        log::set_max_level(level);
    }

    if let Err(err) = try_main(&args, &config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Level from the config file, unless `RUST_LOG` already chose one.
fn configured_max_level(rust_log: Option<&str>, level: LogLevel) -> Option<log::LevelFilter> {
    match rust_log {
        Some(filter) if !filter.trim().is_empty() => None,
        _ => Some(level.to_level_filter()),
    }
}

fn try_main(args: &Args, config: &AnnotatorConfig) -> pointmark::Result<()> {
    let annotator = Annotator::open(&args.imgs_dir, &args.outdir, config)?;
    let labels = LabelInput::new(config.labels);
    pointmark::app::run(annotator, labels)
}
