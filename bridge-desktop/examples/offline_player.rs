//! Headless offline player
//!
//! Caches one remote track in the per-user store, asks before downloading,
//! then plays it on the simulated engine and saves the position on exit.
//! Running it again resumes where the previous run stopped, without
//! downloading.
//!
//! Run with:
//! ```bash
//! cargo run -p bridge-desktop --example offline_player -- https://example.com/intro.mp3 "Introduction"
//!
//! # JSON logs, play for 30 seconds
//! cargo run -p bridge-desktop --example offline_player -- https://example.com/intro.mp3 Intro json 30
//! ```

use bridge_desktop::{default_store_dir, ReqwestDownloaderFactory, SimulatedEngine, TerminalPrompt};
use bridge_traits::LogLevel;
use core_playback::{PlaybackCoordinator, PlayerContext, TrackController, TrackInfo};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::{CoreEvent, PlayerConfig, TrackEvent};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(url) = args.first().cloned() else {
        eprintln!("usage: offline_player <url> [label] [pretty|json|compact] [seconds]");
        std::process::exit(2);
    };
    let label = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| url.rsplit('/').next().unwrap_or(&url).to_string());
    let format = match args.get(2).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };
    let play_for = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(10));

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Info)
            .with_redaction(true),
    )?;

    let mut config = PlayerConfig::builder().download_timeout(Duration::from_secs(300));
    if let Some(dir) = default_store_dir() {
        config = config.store_dir(dir);
    }
    let ctx = PlayerContext::new(
        config.build()?,
        Arc::new(ReqwestDownloaderFactory::new()?),
        Arc::new(TerminalPrompt),
    );

    let coordinator = PlaybackCoordinator::new();
    let track = TrackController::new(
        TrackInfo::new(&url, &label, &url),
        Arc::new(SimulatedEngine::new().with_tick_period(Duration::from_secs(1))),
        &ctx,
    );
    coordinator.attach(&track);

    let mut events = ctx.events.stream().for_track(track.key());
    tokio::spawn(async move {
        while let Ok(CoreEvent::Track(event)) = events.recv().await {
            match event {
                TrackEvent::DownloadProgress { loaded, total, computable: true, .. } => {
                    println!("  downloading {} / {} bytes", loaded, total);
                }
                TrackEvent::PositionChanged { display, .. } => println!("  {}", display),
                _ => {}
            }
        }
    });

    track.initialize().await?;
    info!(state = %track.state(), "Track ready");

    if track.pending_download() {
        track.request_download().await?;
        if !track.downloaded() {
            warn!("Download declined, nothing to play");
            return Ok(());
        }
    }

    println!("{} {}", track.view().control_symbol, track.label());
    track.toggle().await?;
    tokio::time::sleep(play_for).await;
    track.toggle().await?;
    track.flush_writes().await;

    println!("{} stopped at {}", track.view().control_symbol, track.view().time_display);
    Ok(())
}
