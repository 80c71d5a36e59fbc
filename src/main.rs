use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use driftnet::{snapshot, Backdrop, Cascade, ParticleField, Settings};
use rand::{rngs::SmallRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "driftnet",
    version,
    about = "Animated particle-network backdrops"
)]
struct Cli {
    /// JSON settings file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which backdrop to run.
    #[arg(long, value_enum, default_value_t = Effect::Network)]
    effect: Effect,

    /// Render offscreen and write the last frame to this PNG instead of
    /// opening a window.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames to simulate before the snapshot is taken.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Snapshot width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Snapshot height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Seed for a reproducible layout.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable the periodic frame heartbeat.
    #[arg(long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Effect {
    Network,
    Cascade,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if cli.debug {
        settings.diagnostics.debug = true;
    }

    let backdrop = build_backdrop(&cli, &settings);
    info!(effect = backdrop.name(), seed = ?cli.seed, "starting");

    match &cli.snapshot {
        Some(path) => {
            let (surface, stats) = snapshot(backdrop, &settings, cli.width, cli.height, cli.frames);
            if stats.dropped > 0 {
                warn!(dropped = stats.dropped, "some frames were dropped");
            }
            surface
                .save_png(path)
                .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
            info!(path = %path.display(), frames = stats.rendered, "snapshot written");
        }
        None => driftnet::run_window(backdrop, &settings).context("window host failed")?,
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_backdrop(cli: &Cli, settings: &Settings) -> Box<dyn Backdrop> {
    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let (width, height) = (cli.width as f32, cli.height as f32);
    match cli.effect {
        Effect::Network => Box::new(ParticleField::from_settings(settings, width, height, rng)),
        Effect::Cascade => Box::new(Cascade::from_settings(settings, width, height, rng)),
    }
}
