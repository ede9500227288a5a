//! Application entry point for the duct-flow tracer.
//!
//! By default this opens the interactive [`Viewer`] from the `viewer`
//! module. With `--headless` it runs the configured number of frames and
//! writes one snapshot per frame through the `export` module instead.

mod export;
mod viewer;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tunnel_core::{Config, Simulation};
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(about = "Tracer particles advected through a venturi duct")]
struct Args {
    /// YAML run configuration; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window and write frame snapshots to `--out`.
    #[arg(long)]
    headless: bool,

    /// Number of frames for a headless run, overriding the configuration.
    #[arg(long)]
    frames: Option<usize>,

    /// Output directory for a headless run.
    #[arg(long, default_value = "tunnel_simulation")]
    out: PathBuf,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::load_yaml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(frames) = args.frames {
        cfg.frame_count = frames;
    }
    Ok(cfg)
}

fn run_headless(cfg: &Config, out: &std::path::Path) -> Result<()> {
    let mut rng = cfg.rng();
    let mut sim = Simulation::new(cfg, &mut rng).context("setting up simulation")?;
    let summary = export::run(&mut sim, cfg.frame_count, out, cfg.fps, &mut rng)?;
    log::info!(
        "{} frames, {} particles recycled",
        summary.frames,
        summary.respawned
    );
    Ok(())
}

/// Starts the native eframe application.
///
/// Setup errors are reported before any window opens.
fn run_viewer(cfg: Config) -> Result<()> {
    let viewer = Viewer::new(cfg).context("setting up simulation")?;
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Duct Flow",
        options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = load_config(&args)?;

    if args.headless {
        if let Err(e) = run_headless(&cfg, &args.out) {
            log::error!("headless run failed: {e:#}");
            return Err(e);
        }
        Ok(())
    } else {
        run_viewer(cfg)
    }
}
