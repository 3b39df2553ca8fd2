//! Shared fakes for the playback integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, ConfirmationPrompt, DownloadProgress, Downloader, DownloaderFactory, MediaEngine,
    ProgressCallback, TimeUpdate, TimeUpdateCallback,
};
use bytes::Bytes;
use core_async::sync::Notify;
use core_playback::{PlayerContext, TrackController, TrackInfo};
use core_runtime::events::{CoreEvent, Receiver, TrackEvent};
use core_runtime::PlayerConfig;
use core_store::Collection;
use mockall::mock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TRACK_DURATION: f64 = 180.0;

pub fn payload() -> Bytes {
    Bytes::from_static(b"ID3\x04\x00fake-mp3-frames")
}

pub fn intro() -> TrackInfo {
    TrackInfo::new("intro", "Introduction", "https://cdn.example.test/intro.mp3")
}

// ============================================================================
// Media engine
// ============================================================================

type SharedCallback = Arc<dyn Fn(TimeUpdate) + Send + Sync>;

#[derive(Default)]
struct EngineState {
    source: Option<Bytes>,
    position: f64,
    playing: bool,
    seeks: Vec<f64>,
    callback: Option<SharedCallback>,
}

/// In-memory engine. Time only advances through [`FakeEngine::tick`].
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<EngineState>,
    fail_play: bool,
    failing_loads: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_play() -> Arc<Self> {
        Arc::new(Self {
            fail_play: true,
            ..Self::default()
        })
    }

    /// Rejects the next `count` loads.
    pub fn failing_loads(count: usize) -> Arc<Self> {
        Arc::new(Self {
            failing_loads: AtomicUsize::new(count),
            ..Self::default()
        })
    }

    /// Advance to `current` and fire the tick callback.
    pub fn tick(&self, current: f64) {
        let callback = {
            let mut state = self.state.lock();
            state.position = current;
            state.callback.clone()
        };
        if let Some(callback) = callback {
            callback(TimeUpdate {
                current_time: current,
                duration: Some(TRACK_DURATION),
            });
        }
    }

    pub fn source(&self) -> Option<Bytes> {
        self.state.lock().source.clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state.lock().seeks.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    fn load(&self, payload: Bytes) -> BridgeResult<()> {
        let remaining = self.failing_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(BridgeError::OperationFailed("decoder not ready".into()));
        }
        let mut state = self.state.lock();
        state.source = Some(payload);
        state.position = 0.0;
        Ok(())
    }

    fn has_source(&self) -> bool {
        self.state.lock().source.is_some()
    }

    fn seek(&self, position: f64) {
        let mut state = self.state.lock();
        state.position = position;
        state.seeks.push(position);
    }

    fn current_time(&self) -> f64 {
        self.state.lock().position
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().source.as_ref().map(|_| TRACK_DURATION)
    }

    async fn play(&self) -> BridgeResult<()> {
        if self.fail_play {
            return Err(BridgeError::OperationFailed("output device busy".into()));
        }
        self.state.lock().playing = true;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn set_time_update_callback(&self, callback: TimeUpdateCallback) {
        self.state.lock().callback = Some(Arc::from(callback));
    }
}

// ============================================================================
// Downloads
// ============================================================================

#[derive(Clone)]
pub enum Behavior {
    /// Report progress, then resolve with the payload.
    Succeed(Bytes),
    /// Reject with a transport error.
    Fail(String),
    /// Never resolve.
    Hang,
    /// Report half the payload, then wait for the gate.
    Gated(Arc<Notify>, Bytes),
}

pub struct ScriptedDownloader {
    url: String,
    behavior: Behavior,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl Downloader for ScriptedDownloader {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, on_progress: ProgressCallback) -> BridgeResult<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(body) => {
                let len = body.len() as u64;
                on_progress(DownloadProgress::new(len / 2, Some(len)));
                on_progress(DownloadProgress::new(len, Some(len)));
                Ok(body.clone())
            }
            Behavior::Fail(message) => Err(BridgeError::Transport(message.clone())),
            Behavior::Hang => std::future::pending().await,
            Behavior::Gated(gate, body) => {
                let len = body.len() as u64;
                on_progress(DownloadProgress::new(len / 2, Some(len)));
                on_progress(DownloadProgress::new(len / 2 + 1, None));
                gate.notified().await;
                on_progress(DownloadProgress::new(len, Some(len)));
                Ok(body.clone())
            }
        }
    }
}

/// Hands out downloaders following a script, then the default behavior.
pub struct ScriptedFactory {
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    created: AtomicUsize,
    fetches: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(fallback: Behavior) -> Arc<Self> {
        Self::scripted(Vec::new(), fallback)
    }

    pub fn scripted(script: Vec<Behavior>, fallback: Behavior) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            created: AtomicUsize::new(0),
            fetches: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DownloaderFactory for ScriptedFactory {
    fn create(&self, url: &str) -> Arc<dyn Downloader> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let behavior = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Arc::new(ScriptedDownloader {
            url: url.to_string(),
            behavior,
            fetches: Arc::clone(&self.fetches),
        })
    }
}

// ============================================================================
// Prompt
// ============================================================================

mock! {
    pub Prompt {}

    #[async_trait]
    impl ConfirmationPrompt for Prompt {
        async fn confirm(&self, message: &str) -> bool;
    }
}

pub fn answering(answer: bool) -> Arc<MockPrompt> {
    let mut prompt = MockPrompt::new();
    prompt.expect_confirm().returning(move |_| answer);
    Arc::new(prompt)
}

pub fn never_asked() -> Arc<MockPrompt> {
    let mut prompt = MockPrompt::new();
    prompt.expect_confirm().never();
    Arc::new(prompt)
}

// ============================================================================
// Wiring
// ============================================================================

pub fn context(
    config: PlayerConfig,
    factory: Arc<ScriptedFactory>,
    prompt: Arc<MockPrompt>,
) -> PlayerContext {
    PlayerContext::new(config, factory, prompt)
}

pub async fn collection(ctx: &PlayerContext, name: &str) -> Collection {
    let config = &ctx.config;
    ctx.stores
        .open(&config.store_name, config.store_version, &config.collections())
        .await
        .unwrap()
        .get_collection(name)
        .unwrap()
}

/// Store `body` as the cached payload of `key`.
pub async fn seed_payload(ctx: &PlayerContext, key: &str, body: Bytes) {
    collection(ctx, &ctx.config.blobs_collection)
        .await
        .put(key, body)
        .await
        .unwrap();
}

pub async fn seed_position(ctx: &PlayerContext, key: &str, position: f64) {
    collection(ctx, &ctx.config.positions_collection)
        .await
        .put(key, position)
        .await
        .unwrap();
}

/// A controller whose payload is already cached, initialized and ready.
pub async fn ready_track(
    ctx: &PlayerContext,
    info: TrackInfo,
    engine: Arc<FakeEngine>,
) -> Arc<TrackController> {
    seed_payload(ctx, &info.key, payload()).await;
    let track = TrackController::new(info, engine, ctx);
    track.initialize().await.unwrap();
    track
}

/// Poll `condition` until it holds, yielding to spawned tasks in between.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        core_async::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 1s");
}

/// Every event published so far that `rx` has not consumed.
pub fn drain(rx: &mut Receiver<CoreEvent>) -> Vec<TrackEvent> {
    let mut events = Vec::new();
    while let Ok(CoreEvent::Track(event)) = rx.try_recv() {
        events.push(event);
    }
    events
}
