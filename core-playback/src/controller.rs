//! # Track Controller
//!
//! Owns the lifecycle of one cacheable track: binding to the store, asking
//! before downloading, persisting the payload, configuring the media engine,
//! restoring and saving the playback position.
//!
//! ## Lifecycle
//!
//! ```text
//! new()          -> constructed
//! initialize()   -> initialized -> downloaded          (payload cached)
//!                               -> pending-download    (not cached)
//! request_download()
//!                -> downloading -> downloaded          (fetched and stored)
//!                               -> pending-download    (failed, cancelled, timed out)
//! play()         -> loading -> playing
//! pause()        -> paused
//! ```
//!
//! Every state change is validated by [`TrackState::can_transition_to`] and
//! published on the shared [`EventBus`](core_runtime::EventBus).
//!
//! ## Persistence
//!
//! The downloaded payload is written according to
//! [`PersistencePolicy`]. Position writes are always
//! background writes; they are queued to one writer task per controller so a
//! later position is never overwritten by an earlier one, and
//! [`TrackController::flush_writes`] waits for them.

use crate::context::PlayerContext;
use crate::error::{PlaybackError, Result};
use crate::format::time_display;
use crate::state::TrackState;
use crate::track::TrackInfo;
use crate::traits::PlaybackListener;
use crate::view::TrackView;
use bridge_traits::{DownloadProgress, Downloader, MediaEngine, ProgressCallback, TimeUpdate};
use bytes::Bytes;
use core_async::sync::{mpsc, oneshot, CancellationToken};
use core_async::task::JoinHandle;
use core_runtime::{CoreEvent, PersistencePolicy, TrackEvent};
use core_store::{Collection, Value};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

/// How a download request ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Payload fetched, stored and configured on the engine.
    Completed,
    /// The user declined the prompt; the track stays `pending-download`.
    Declined,
    /// Nothing to do: the payload is cached or a download is in flight.
    Skipped,
}

struct Bindings {
    blobs: Collection,
    positions: Collection,
}

enum PositionWrite {
    Save(f64),
    Flush(oneshot::Sender<()>),
}

fn spawn_position_writer(key: String, positions: Collection) -> mpsc::UnboundedSender<PositionWrite> {
    let (writer, mut queue) = mpsc::unbounded_channel();
    core_async::spawn(async move {
        while let Some(mut write) = queue.recv().await {
            // Only the newest queued position needs to land.
            let mut latest = None;
            loop {
                match write {
                    PositionWrite::Save(position) => latest = Some(position),
                    PositionWrite::Flush(done) => {
                        if let Some(position) = latest.take() {
                            save_position(&positions, &key, position).await;
                        }
                        done.send(()).ok();
                    }
                }
                match queue.try_recv() {
                    Ok(next) => write = next,
                    Err(_) => break,
                }
            }
            if let Some(position) = latest {
                save_position(&positions, &key, position).await;
            }
        }
        debug!(key = %key, "Position writer stopped");
    });
    writer
}

async fn save_position(positions: &Collection, key: &str, position: f64) {
    if let Err(e) = positions.put(key, position).await {
        warn!(key = %key, error = %e, "Position write failed");
    }
}

struct Inner {
    state: TrackState,
    bindings: Option<Bindings>,
    /// Bound to the track URL on entering `pending-download`, consumed by
    /// the next download attempt.
    downloader: Option<Arc<dyn Downloader>>,
    cancel: Option<CancellationToken>,
    progress: Option<DownloadProgress>,
    time_display: String,
    payload_ready: bool,
    position_writer: Option<mpsc::UnboundedSender<PositionWrite>>,
    payload_write: Option<JoinHandle<()>>,
}

/// Drives one track through its cache and playback lifecycle.
///
/// Controllers are always handled through an `Arc` so listeners and engine
/// callbacks can refer back to them.
pub struct TrackController {
    info: TrackInfo,
    ctx: PlayerContext,
    engine: Arc<dyn MediaEngine>,
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<Weak<dyn PlaybackListener>>>,
    self_ref: Weak<TrackController>,
}

impl TrackController {
    /// Creates a controller in the `constructed` state. No I/O happens until
    /// [`initialize`](Self::initialize).
    pub fn new(info: TrackInfo, engine: Arc<dyn MediaEngine>, ctx: &PlayerContext) -> Arc<Self> {
        debug!(key = %info.key, "Track constructed");
        Arc::new_cyclic(|self_ref| Self {
            info,
            ctx: ctx.clone(),
            engine,
            inner: Mutex::new(Inner {
                state: TrackState::Constructed,
                bindings: None,
                downloader: None,
                cancel: None,
                progress: None,
                time_display: time_display(0.0, None),
                payload_ready: false,
                position_writer: None,
                payload_write: None,
            }),
            listeners: Mutex::new(Vec::new()),
            self_ref: self_ref.clone(),
        })
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn key(&self) -> &str {
        &self.info.key
    }

    pub fn label(&self) -> &str {
        &self.info.label
    }

    pub fn url(&self) -> &str {
        &self.info.url
    }

    pub fn state(&self) -> TrackState {
        self.inner.lock().state
    }

    pub fn pending_download(&self) -> bool {
        self.state().pending_download()
    }

    pub fn downloading(&self) -> bool {
        self.state().downloading()
    }

    pub fn downloaded(&self) -> bool {
        self.state().downloaded()
    }

    pub fn playing(&self) -> bool {
        self.state().playing()
    }

    pub fn paused(&self) -> bool {
        self.state().paused()
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> TrackView {
        let inner = self.inner.lock();
        TrackView {
            key: self.info.key.clone(),
            label: self.info.label.clone(),
            state: inner.state,
            controls: TrackView::controls_for(inner.state, inner.payload_ready),
            control_symbol: TrackView::symbol_for(inner.state),
            progress: inner.progress,
            time_display: inner.time_display.clone(),
        }
    }

    pub fn add_listener(&self, listener: Weak<dyn PlaybackListener>) {
        self.listeners.lock().push(listener);
    }

    pub fn remove_listener(&self, listener: &Weak<dyn PlaybackListener>) {
        self.listeners
            .lock()
            .retain(|l| l.strong_count() > 0 && !Weak::ptr_eq(l, listener));
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Opens the store, binds both collections and looks the payload up.
    ///
    /// Ends in `downloaded` when the payload is cached and in
    /// `pending-download` otherwise. A store that cannot be opened is fatal
    /// to this controller: the error is returned and the state stays
    /// `constructed`. When the lookup or the engine setup fails the track
    /// stays `initialized` and calling this again retries the lookup. Once
    /// the cache check has completed, further calls do nothing.
    #[instrument(skip(self), fields(key = %self.info.key))]
    pub async fn initialize(&self) -> Result<()> {
        let blobs = match self.state() {
            TrackState::Constructed => self.bind().await?,
            TrackState::Initialized => {
                debug!("Retrying cache lookup");
                self.bindings(|b| b.blobs.clone())?
            }
            state => {
                debug!(%state, "Already initialized");
                return Ok(());
            }
        };

        match blobs.fetch(&self.info.key).await?.and_then(Value::into_bytes) {
            Some(payload) => {
                debug!(bytes = payload.len(), "Payload found in store");
                self.set_up_playback(payload).await
            }
            None => {
                debug!("Payload not cached");
                let mut inner = self.inner.lock();
                if inner.state != TrackState::Initialized {
                    debug!(state = %inner.state, "Initialized concurrently");
                    return Ok(());
                }
                self.enter_pending_download(&mut inner)
            }
        }
    }

    async fn bind(&self) -> Result<Collection> {
        let config = &self.ctx.config;
        let store = self
            .ctx
            .stores
            .open(&config.store_name, config.store_version, &config.collections())
            .await?;
        let blobs = store.get_collection(&config.blobs_collection)?;
        let positions = store.get_collection(&config.positions_collection)?;

        let mut inner = self.inner.lock();
        self.transition(&mut inner, TrackState::Initialized)?;
        inner.bindings = Some(Bindings {
            blobs: blobs.clone(),
            positions,
        });
        Ok(blobs)
    }

    // ========================================================================
    // Download
    // ========================================================================

    /// Asks the user, then downloads, stores and configures the payload.
    ///
    /// Only acts in `pending-download`; the state is checked again after the
    /// prompt so two overlapping requests never start two downloads. On
    /// failure the track returns to `pending-download` with a fresh
    /// downloader and the error is returned.
    #[instrument(skip(self), fields(key = %self.info.key))]
    pub async fn request_download(&self) -> Result<DownloadOutcome> {
        let state = self.state();
        if !state.pending_download() {
            debug!(%state, "No download pending");
            return Ok(DownloadOutcome::Skipped);
        }

        let message = self.ctx.config.confirm_message(&self.info.label);
        if !self.ctx.prompt.confirm(&message).await {
            info!("Download declined");
            return Ok(DownloadOutcome::Declined);
        }

        let (downloader, token) = {
            let mut inner = self.inner.lock();
            if !inner.state.pending_download() {
                debug!(state = %inner.state, "Download started while prompting");
                return Ok(DownloadOutcome::Skipped);
            }
            self.transition(&mut inner, TrackState::Downloading)?;
            let downloader = inner
                .downloader
                .take()
                .unwrap_or_else(|| self.ctx.downloaders.create(&self.info.url));
            let token = CancellationToken::new();
            inner.cancel = Some(token.clone());
            inner.progress = None;
            (downloader, token)
        };

        info!(url = %self.info.url, "Download started");
        let result = self.download(downloader, token).await;
        self.inner.lock().cancel = None;

        match result {
            Ok(()) => {
                info!("Download complete");
                Ok(DownloadOutcome::Completed)
            }
            Err(err) => {
                warn!(error = %err, "Download failed");
                self.emit(TrackEvent::DownloadFailed {
                    key: self.info.key.clone(),
                    message: err.to_string(),
                    recoverable: err.is_recoverable(),
                });
                let mut inner = self.inner.lock();
                if inner.state.downloading() {
                    self.enter_pending_download(&mut inner)?;
                }
                Err(err)
            }
        }
    }

    /// Aborts the in-flight download, if any. Returns whether one was
    /// running.
    pub fn cancel_download(&self) -> bool {
        match self.inner.lock().cancel.as_ref() {
            Some(token) => {
                info!(key = %self.info.key, "Cancelling download");
                token.cancel();
                true
            }
            None => false,
        }
    }

    async fn download(&self, downloader: Arc<dyn Downloader>, token: CancellationToken) -> Result<()> {
        let blobs = self.bindings(|b| b.blobs.clone())?;
        let payload = self.fetch(downloader, token).await?;
        debug!(bytes = payload.len(), "Payload received");

        match self.ctx.config.payload_persistence {
            PersistencePolicy::AwaitCommit => {
                blobs.put(&self.info.key, payload.clone()).await?;
            }
            PersistencePolicy::FireAndForget => {
                let key = self.info.key.clone();
                let payload = payload.clone();
                let handle = core_async::spawn(async move {
                    if let Err(e) = blobs.put(&key, payload).await {
                        warn!(key = %key, error = %e, "Background payload write failed");
                    }
                });
                self.inner.lock().payload_write = Some(handle);
            }
        }

        self.set_up_playback(payload).await
    }

    async fn fetch(&self, downloader: Arc<dyn Downloader>, token: CancellationToken) -> Result<Bytes> {
        let on_progress = self.progress_callback();
        let limit = self.ctx.config.download_timeout;

        let transfer = async move {
            let fetch = downloader.fetch(on_progress);
            match limit {
                Some(limit) => match core_async::time::timeout(limit, fetch).await {
                    Ok(result) => result.map_err(PlaybackError::from),
                    Err(_) => Err(PlaybackError::DownloadTimedOut(limit)),
                },
                None => fetch.await.map_err(PlaybackError::from),
            }
        };

        // Dropping `transfer` aborts the request.
        core_async::select! {
            biased;
            _ = token.cancelled() => Err(PlaybackError::DownloadCancelled),
            result = transfer => result,
        }
    }

    fn progress_callback(&self) -> ProgressCallback {
        let track = self.self_ref.clone();
        Arc::new(move |progress| {
            if let Some(track) = track.upgrade() {
                track.on_progress(progress);
            }
        })
    }

    fn on_progress(&self, progress: DownloadProgress) {
        if progress.computable {
            self.inner.lock().progress = Some(progress);
        }
        self.emit(TrackEvent::DownloadProgress {
            key: self.info.key.clone(),
            loaded: progress.loaded,
            total: progress.total,
            computable: progress.computable,
        });
    }

    fn enter_pending_download(&self, inner: &mut Inner) -> Result<()> {
        self.transition(inner, TrackState::PendingDownload)?;
        inner.downloader = Some(self.ctx.downloaders.create(&self.info.url));
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Configures the engine, restores the stored position and marks the
    /// track `downloaded`.
    async fn set_up_playback(&self, payload: Bytes) -> Result<()> {
        let positions = self.bindings(|b| b.positions.clone())?;

        self.engine
            .load(payload)
            .map_err(|e| PlaybackError::EngineFailed(e.to_string()))?;

        let track = self.self_ref.clone();
        self.engine.set_time_update_callback(Box::new(move |update| {
            if let Some(track) = track.upgrade() {
                track.on_time_update(update);
            }
        }));

        let resume_at = match positions.fetch(&self.info.key).await {
            Ok(value) => value.and_then(|v| v.as_f64()).unwrap_or(0.0),
            Err(e) => {
                warn!(key = %self.info.key, error = %e, "Stored position unreadable, starting from the beginning");
                0.0
            }
        };
        if resume_at > 0.0 {
            debug!(key = %self.info.key, position = resume_at, "Resuming from stored position");
            self.engine.seek(resume_at);
        }

        let mut inner = self.inner.lock();
        inner.payload_ready = true;
        inner.progress = None;
        inner.time_display = time_display(resume_at, self.engine.duration());
        self.transition(&mut inner, TrackState::Downloaded)
    }

    /// Starts playback.
    ///
    /// Fails with [`PlaybackError::NoSourceConfigured`] without changing
    /// state when no payload is configured. Does nothing while already
    /// `loading` or `playing`. Attached listeners are told before the track
    /// reports `playing`; a [`pause`](Self::pause) issued meanwhile wins and
    /// the track ends `paused`.
    #[instrument(skip(self), fields(key = %self.info.key))]
    pub async fn play(&self) -> Result<()> {
        let previous = {
            let mut inner = self.inner.lock();
            match inner.state {
                TrackState::Loading | TrackState::Playing => {
                    debug!(state = %inner.state, "Already playing");
                    return Ok(());
                }
                TrackState::Downloaded | TrackState::Paused if self.engine.has_source() => {}
                _ => return Err(PlaybackError::NoSourceConfigured),
            }
            let previous = inner.state;
            self.transition(&mut inner, TrackState::Loading)?;
            previous
        };

        if let Err(e) = self.engine.play().await {
            let mut inner = self.inner.lock();
            if inner.state == TrackState::Loading {
                self.transition(&mut inner, previous)?;
            }
            return Err(PlaybackError::EngineFailed(e.to_string()));
        }

        if self.state() == TrackState::Loading {
            if let Some(me) = self.self_ref.upgrade() {
                self.notify(|listener| listener.on_play_started(&me));
            }
        }

        {
            let mut inner = self.inner.lock();
            if inner.state != TrackState::Loading {
                debug!(state = %inner.state, "Superseded while loading");
                if inner.state == TrackState::Paused {
                    // The engine may have started after the pause reached it.
                    self.engine.pause();
                }
                return Ok(());
            }
            self.transition(&mut inner, TrackState::Playing)?;
        }

        self.emit(TrackEvent::PlayStarted {
            key: self.info.key.clone(),
        });
        info!("Playback started");
        Ok(())
    }

    /// Pauses playback and saves the current position.
    ///
    /// Pausing a paused track is a no-op. Pausing while `loading` cancels the
    /// start. Pausing in any other state is an
    /// [`PlaybackError::IllegalTransition`].
    pub fn pause(&self) -> Result<()> {
        let position = {
            let mut inner = self.inner.lock();
            match inner.state {
                TrackState::Paused => return Ok(()),
                TrackState::Playing | TrackState::Loading => {}
                from => {
                    return Err(PlaybackError::IllegalTransition {
                        from,
                        to: TrackState::Paused,
                    })
                }
            }
            self.engine.pause();
            self.transition(&mut inner, TrackState::Paused)?;
            let position = self.engine.current_time();
            self.persist_position(&mut inner, position);
            position
        };

        self.emit(TrackEvent::Paused {
            key: self.info.key.clone(),
        });
        if let Some(me) = self.self_ref.upgrade() {
            self.notify(|listener| listener.on_paused(&me));
        }
        info!(key = %self.info.key, position, "Playback paused");
        Ok(())
    }

    /// Plays unless playing, pauses otherwise.
    pub async fn toggle(&self) -> Result<()> {
        if self.playing() {
            self.pause()
        } else {
            self.play().await
        }
    }

    fn on_time_update(&self, update: TimeUpdate) {
        let display = time_display(update.current_time, update.duration);
        {
            let mut inner = self.inner.lock();
            if !inner.state.playing() {
                return;
            }
            inner.time_display = display.clone();
            // Queued under the same guard as the state check so a tick racing
            // `pause` is never written after the paused position.
            self.persist_position(&mut inner, update.current_time);
        }

        self.emit(TrackEvent::PositionChanged {
            key: self.info.key.clone(),
            current: update.current_time,
            duration: update.duration,
            display,
        });
    }

    // ========================================================================
    // Background writes
    // ========================================================================

    /// Queues a position write. Writes go through one writer task per
    /// controller, in the order they were queued.
    fn persist_position(&self, inner: &mut Inner, position: f64) {
        if !core_async::runtime::in_runtime() {
            debug!(key = %self.info.key, "No runtime, position not saved");
            return;
        }
        let Some(positions) = inner.bindings.as_ref().map(|b| b.positions.clone()) else {
            return;
        };

        let mut write = PositionWrite::Save(position);
        if let Some(writer) = inner.position_writer.as_ref() {
            match writer.send(write) {
                Ok(()) => return,
                // The writer's runtime has shut down; start a new one.
                Err(mpsc::error::SendError(unsent)) => write = unsent,
            }
        }
        let writer = spawn_position_writer(self.info.key.clone(), positions);
        if writer.send(write).is_err() {
            warn!(key = %self.info.key, "Position writer unavailable");
        }
        inner.position_writer = Some(writer);
    }

    /// Waits for background payload and position writes issued so far.
    pub async fn flush_writes(&self) {
        let (payload, barrier) = {
            let mut inner = self.inner.lock();
            let barrier = inner.position_writer.as_ref().and_then(|writer| {
                let (done, barrier) = oneshot::channel();
                writer.send(PositionWrite::Flush(done)).ok().map(|()| barrier)
            });
            (inner.payload_write.take(), barrier)
        };
        if let Some(handle) = payload {
            if let Err(e) = handle.await {
                warn!(key = %self.info.key, error = %e, "Background payload write failed to run");
            }
        }
        if let Some(barrier) = barrier {
            if barrier.await.is_err() {
                warn!(key = %self.info.key, "Position writer stopped before flushing");
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn transition(&self, inner: &mut Inner, to: TrackState) -> Result<()> {
        let from = inner.state;
        if !from.can_transition_to(to) {
            return Err(PlaybackError::IllegalTransition { from, to });
        }
        inner.state = to;
        debug!(key = %self.info.key, %from, %to, "Track state changed");
        self.emit(TrackEvent::StateChanged {
            key: self.info.key.clone(),
            from: from.attribute().to_string(),
            to: to.attribute().to_string(),
        });
        Ok(())
    }

    fn bindings<T>(&self, f: impl FnOnce(&Bindings) -> T) -> Result<T> {
        self.inner
            .lock()
            .bindings
            .as_ref()
            .map(f)
            .ok_or(PlaybackError::NotInitialized)
    }

    fn emit(&self, event: TrackEvent) {
        // No subscribers is fine.
        self.ctx.events.emit(CoreEvent::Track(event)).ok();
    }

    fn notify(&self, f: impl Fn(&dyn PlaybackListener)) {
        let listeners: Vec<Arc<dyn PlaybackListener>> = {
            let mut registered = self.listeners.lock();
            registered.retain(|l| l.strong_count() > 0);
            registered.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in listeners {
            f(listener.as_ref());
        }
    }
}

impl Drop for TrackController {
    fn drop(&mut self) {
        if let Some(token) = self.inner.get_mut().cancel.take() {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for TrackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackController")
            .field("info", &self.info)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
