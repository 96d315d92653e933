//! marker_runner: replays captured screenshots through the aim loop.
//!
//! Usage:
//!   marker_runner --frames <DIR> [--config <JSON>] [--overlay-dir <DIR>] [--engaged]
//!
//! Movements are logged, not injected. Press Ctrl-C to stop early.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use marker_vision::{
    ActivationProvider, AimLoop, AimPipeline, CaptureRegion, DisplayControl, FrameSource, InputSink,
    LoopConfig, VisionError,
};
use tracing::{info, warn};

mod config;
mod logging;
mod replay;
mod sinks;

use config::RunnerConfig;
use replay::DirectoryFrameSource;
use sinks::{PngOverlayDisplay, RecordingInputSink};

#[derive(Parser)]
#[command(
    name = "marker_runner",
    about = "Replay screenshots through the marker detection and aim loop",
    version
)]
struct Cli {
    /// Directory of screenshots, replayed in file name order
    #[arg(long)]
    frames: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write annotated overlays into this directory
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// Treat the activation key as held for the whole run
    #[arg(long)]
    engaged: bool,

    /// Delay between cycles in milliseconds
    #[arg(long, default_value = "25")]
    cycle_ms: u64,

    /// Start over from the first screenshot after the last one
    #[arg(long)]
    repeat: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if cli.json_logs {
        config.logging.json = true;
    }
    logging::init_logging(&config.logging, cli.verbose)?;

    let pipeline = AimPipeline::new(config.detection.clone()).context("invalid detection configuration")?;

    let source = DirectoryFrameSource::open(&cli.frames, cli.repeat)
        .with_context(|| format!("cannot replay {}", cli.frames.display()))?;
    let (screen_width, screen_height) = source.screen_dimensions()?;
    let region = CaptureRegion::centered(screen_width, screen_height, config.detection.square_size);
    info!(
        frames = source.len(),
        screen_width,
        screen_height,
        left = region.left,
        top = region.top,
        size = region.size,
        "replay starting"
    );

    let engaged = cli.engaged;
    let mut aim = AimLoop::new(pipeline, region, source, move || engaged, RecordingInputSink::default())
        .with_config(LoopConfig {
            cycle_delay: Duration::from_millis(cli.cycle_ms),
        });
    if let Some(dir) = &cli.overlay_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create overlay directory {}", dir.display()))?;
        aim = aim.with_display(Box::new(PngOverlayDisplay::new(dir.clone())));
    }

    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    drive(&mut aim, ctrl_c).await?;

    let stats = aim.stats();
    let (total_dx, total_dy) = aim.input().total();
    info!(
        cycles = stats.cycles,
        selections = stats.selections,
        movements = stats.movements,
        recorded = aim.input().moves().len(),
        total_dx,
        total_dy,
        "run complete"
    );
    Ok(())
}

/// Steps `aim` until the source runs dry, the display asks to stop or `shutdown`
/// resolves. `shutdown` is polled once before the first cycle so that a signal
/// listener is subscribed while frames are being processed.
async fn drive<S, A, I>(aim: &mut AimLoop<S, A, I>, shutdown: impl Future<Output = ()>) -> anyhow::Result<()>
where
    S: FrameSource,
    A: ActivationProvider,
    I: InputSink,
{
    tokio::pin!(shutdown);
    tokio::select! {
        biased;
        _ = &mut shutdown => {
            info!("interrupted before the first frame");
            return Ok(());
        }
        _ = std::future::ready(()) => {}
    }

    let delay = aim.config().cycle_delay;
    loop {
        match aim.step() {
            Ok(outcome) => {
                if outcome.control == DisplayControl::Stop {
                    return Ok(());
                }
            }
            Err(VisionError::SourceExhausted { frames }) => {
                info!(frames, "replay finished");
                return Ok(());
            }
            Err(error) => return Err(error).context("aim loop stopped"),
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("interrupted");
                return Ok(());
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
