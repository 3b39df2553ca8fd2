//! End-to-end: real HTTP download, file-backed store, simulated engine.

use bridge_desktop::{ReqwestDownloaderFactory, ScriptedPrompt, SimulatedEngine};
use bridge_traits::MediaEngine;
use core_playback::{DownloadOutcome, PlaybackCoordinator, PlayerContext, TrackController, TrackInfo};
use core_runtime::PlayerConfig;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves `body` to every connection; returns the URL and a request counter.
async fn serve(body: Vec<u8>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                socket.write_all(head.as_bytes()).await.ok();
                socket.write_all(&body).await.ok();
                socket.shutdown().await.ok();
            });
        }
    });

    (format!("http://{}/episode-1.mp3", addr), requests)
}

fn context(dir: &Path, prompt: Arc<ScriptedPrompt>) -> PlayerContext {
    let config = PlayerConfig::builder()
        .store_dir(dir)
        .download_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    PlayerContext::new(config, Arc::new(ReqwestDownloaderFactory::new().unwrap()), prompt)
}

fn engine() -> Arc<SimulatedEngine> {
    // One byte per second of audio.
    Arc::new(
        SimulatedEngine::new()
            .with_bitrate(8)
            .with_tick_period(Duration::from_millis(10)),
    )
}

#[tokio::test]
async fn test_download_play_and_resume_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let (url, requests) = serve(vec![7u8; 600]).await;
    let info = TrackInfo::new("episode-1", "Episode 1", &url);

    {
        let prompt = Arc::new(ScriptedPrompt::new([true]));
        let ctx = context(dir.path(), prompt.clone());
        let track = TrackController::new(info.clone(), engine(), &ctx);
        track.initialize().await.unwrap();
        assert!(track.pending_download());

        assert_eq!(track.request_download().await.unwrap(), DownloadOutcome::Completed);
        assert!(prompt.messages()[0].contains("Episode 1"));
        assert_eq!(track.view().time_display, "0s / 10m 0s");

        track.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        track.pause().unwrap();
        track.flush_writes().await;
        assert!(track.paused());
    }
    assert_eq!(requests.load(Ordering::SeqCst), 1);

    // Second run: nothing is downloaded and playback resumes.
    let prompt = Arc::new(ScriptedPrompt::new(std::iter::empty()));
    let ctx = context(dir.path(), prompt.clone());
    let engine = engine();
    let track = TrackController::new(info, engine.clone(), &ctx);
    track.initialize().await.unwrap();

    assert!(track.downloaded());
    assert!(prompt.messages().is_empty());
    assert_eq!(requests.load(Ordering::SeqCst), 1);
    assert!(engine.current_time() > 0.0, "position restored from the store");
}

#[tokio::test]
async fn test_coordinator_keeps_one_desktop_track_playing() {
    let dir = tempfile::tempdir().unwrap();
    let (url, _) = serve(vec![1u8; 120]).await;
    let ctx = context(dir.path(), Arc::new(ScriptedPrompt::new([true, true])));
    let coordinator = PlaybackCoordinator::new();

    let mut tracks = Vec::new();
    for key in ["a", "b"] {
        let track = TrackController::new(TrackInfo::new(key, key, &url), engine(), &ctx);
        coordinator.attach(&track);
        track.initialize().await.unwrap();
        track.request_download().await.unwrap();
        tracks.push(track);
    }

    tracks[0].play().await.unwrap();
    tracks[1].play().await.unwrap();

    assert!(tracks[0].paused());
    assert!(tracks[1].playing());
}
