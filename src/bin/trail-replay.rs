//! Replay a recorded input log through the trail engine and write the
//! marker state of every frame as JSON.

use anyhow::Context;
use clap::Parser;
use portfolio_trail::replay::replay_file;
use portfolio_trail::{DeviceCapabilities, TrailConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Replay recorded pointer and touch input through the trail engine")]
struct Args {
    /// Recorded input log (JSON)
    input: PathBuf,

    /// Where to write the per-frame marker states (JSON)
    output: PathBuf,

    /// Output frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Trail configuration file (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay as a touch device
    #[arg(long)]
    touch: bool,

    /// Replay as a device without hover support
    #[arg(long)]
    no_hover: bool,
}

fn main() -> anyhow::Result<()> {
    portfolio_trail::init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrailConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrailConfig::default(),
    };
    let capabilities = DeviceCapabilities::new(args.touch, !args.no_hover);

    let frames = replay_file(&args.input, &args.output, config, capabilities, args.fps)
        .with_context(|| format!("Failed to replay {}", args.input.display()))?;

    tracing::info!("Wrote {} frames to {}", frames, args.output.display());
    Ok(())
}
