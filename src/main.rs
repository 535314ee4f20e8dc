use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tvplayer::native::SurfaceHandle;
use tvplayer::utils::{format_position, Config};
use tvplayer::{
    AspectMode, HeadlessMediaView, HeadlessOverlayView, MediaPlayer, MediaSource, MediaView,
    PlayerEvent, Rect, SimulatedPlayer,
};

/// TVPlayer - drive a simulated TV media engine through a playback session
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media URI or file path
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Render into a window region instead of an embedded surface
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    overlay: Option<Rect>,

    /// Aspect mode
    #[arg(long, value_enum)]
    aspect: Option<AspectArg>,

    /// How long to play before stopping
    #[arg(long, value_name = "MS", default_value = "1000")]
    play_ms: u64,

    /// Seek to this position after starting
    #[arg(long, value_name = "MS")]
    seek_ms: Option<u32>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print player events as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AspectArg {
    Fit,
    Fill,
    Stretch,
    OriginalSize,
}

impl From<AspectArg> for AspectMode {
    fn from(arg: AspectArg) -> Self {
        match arg {
            AspectArg::Fit => AspectMode::Fit,
            AspectArg::Fill => AspectMode::Fill,
            AspectArg::Stretch => AspectMode::Stretch,
            AspectArg::OriginalSize => AspectMode::OriginalSize,
        }
    }
}

fn parse_rect(value: &str) -> std::result::Result<Rect, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number: {}", e))?;

    match parts.as_slice() {
        [x, y, width, height] => Ok(Rect::new(*x, *y, *width, *height)),
        _ => Err("expected X,Y,W,H".to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    // Initialize logging
    let log_level = if args.debug {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting TVPlayer v{}", env!("CARGO_PKG_VERSION"));

    let engine = Arc::new(SimulatedPlayer::from_config(&config.engine));
    let mut player_config = config.player.clone();
    if let Some(aspect) = args.aspect {
        player_config.aspect_mode = aspect.into();
    }

    let player = MediaPlayer::builder(engine)
        .with_config(player_config)
        .with_display_config(config.display.clone())
        .build()?;

    let json = args.json;
    let _event_sub = player.subscribe_events(move |event| {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize event: {}", e),
            }
            return;
        }
        match event {
            PlayerEvent::PlaybackStarted => info!("Playback started"),
            PlayerEvent::PlaybackPaused => info!("Playback paused"),
            PlayerEvent::PlaybackStopped => info!("Playback stopped"),
            PlayerEvent::PlaybackCompleted => info!("End of media reached"),
            PlayerEvent::UpdateStreamInfo => info!("Stream info available"),
            PlayerEvent::BufferingProgressUpdated { progress } => {
                log::debug!("Buffering: {:.0}%", progress * 100.0);
            }
        }
    });

    let view: Arc<dyn MediaView> = match args.overlay {
        Some(area) => Arc::new(HeadlessOverlayView::new(SurfaceHandle(1), area)),
        None => Arc::new(HeadlessMediaView::new(SurfaceHandle(1))),
    };
    player.set_display(Some(view));

    let source = MediaSource::parse(&args.source);
    info!("Opening {}", source);
    player.set_source(Some(source))?;

    if !player.start().await {
        anyhow::bail!("Playback did not start");
    }
    info!("Playing, duration {}", format_position(player.duration()));

    if let Some(ms) = args.seek_ms {
        let position = player.seek(ms).await;
        info!("Seeked to {}", format_position(position));
    }

    tokio::time::sleep(Duration::from_millis(args.play_ms)).await;
    info!("Position {}", format_position(player.position()));

    player.stop();
    player.wait_settled().await;
    info!("Engine back to {:?}", player.state());

    Ok(())
}
