//! Fete CLI
//!
//! Open the welcome page and throw its confetti, headless or in real time.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fete_app::{FeteApp, FeteConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Frame budget for `fete run` (one minute at 60 Hz)
const DEFAULT_MAX_FRAMES: u64 = 3600;

#[derive(Parser)]
#[command(name = "fete")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Welcome page confetti", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Throw the welcome confetti and report how the run went
    Run {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of pieces
        #[arg(short, long)]
        amount: Option<f32>,

        /// Random seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop after this many refreshes
        #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
        max_frames: u64,

        /// Pace refreshes in real time instead of simulating them
        #[arg(long)]
        realtime: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the page's element tree after a number of refreshes
    Snapshot {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Refreshes to simulate before printing
        #[arg(short, long, default_value = "1")]
        frames: u64,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            config,
            amount,
            seed,
            max_frames,
            realtime,
            json,
        } => cmd_run(config.as_deref(), amount, seed, max_frames, realtime, json),

        Commands::Snapshot {
            config,
            frames,
            seed,
        } => cmd_snapshot(config.as_deref(), frames, seed),
    }
}

fn load_config(path: Option<&Path>) -> Result<FeteConfig> {
    match path {
        Some(path) => FeteConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(FeteConfig::default()),
    }
}

fn cmd_run(
    config: Option<&Path>,
    amount: Option<f32>,
    seed: Option<u64>,
    max_frames: u64,
    realtime: bool,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(amount) = amount {
        config.confetti.amount = amount;
    }
    if seed.is_some() {
        config.confetti.seed = seed;
    }

    let mut app = if realtime {
        FeteApp::realtime(config).context("Failed to start real-time display")?
    } else {
        FeteApp::headless(config).context("Failed to start headless app")?
    };

    info!(
        "Throwing confetti ({}, up to {} frames)",
        if realtime { "real time" } else { "headless" },
        max_frames
    );
    let summary = app.run(max_frames);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        println!("{summary}");
    }

    if !summary.completed {
        tracing::warn!("Frame budget ran out before the confetti finished");
    }
    Ok(())
}

fn cmd_snapshot(config: Option<&Path>, frames: u64, seed: Option<u64>) -> Result<()> {
    let mut config = load_config(config)?;
    if seed.is_some() {
        config.confetti.seed = seed;
    }

    let mut app = FeteApp::headless(config).context("Failed to start headless app")?;
    let summary = app.run(frames);
    info!("Snapshot after {} frames", summary.frames);

    print!("{}", app.document());
    Ok(())
}
