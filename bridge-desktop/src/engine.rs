//! Clock-driven media engine.
//!
//! Desktop hosts plug a real audio backend in behind `MediaEngine`. This
//! engine keeps the playhead on a Tokio interval instead of producing sound,
//! which is enough for headless players, demos and integration tests.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    MediaEngine, TimeUpdate, TimeUpdateCallback,
};
use bytes::Bytes;
use core_async::task::JoinHandle;
use core_async::time::{interval, Instant, MissedTickBehavior};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default assumed bitrate when deriving a duration from payload size.
const DEFAULT_BITRATE_BPS: u64 = 128_000;

type SharedCallback = Arc<dyn Fn(TimeUpdate) + Send + Sync>;

#[derive(Default)]
struct Playhead {
    source: Option<Bytes>,
    position: f64,
    duration: Option<f64>,
    callback: Option<SharedCallback>,
    ticker: Option<JoinHandle<()>>,
}

/// Media engine whose playhead advances in real time while playing.
pub struct SimulatedEngine {
    state: Arc<Mutex<Playhead>>,
    tick_period: Duration,
    bitrate_bps: u64,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Playhead::default())),
            tick_period: Duration::from_millis(250),
            bitrate_bps: DEFAULT_BITRATE_BPS,
        }
    }

    /// How often time updates fire while playing.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period.max(Duration::from_millis(1));
        self
    }

    /// Bitrate used to derive a duration from the payload length.
    pub fn with_bitrate(mut self, bits_per_second: u64) -> Self {
        self.bitrate_bps = bits_per_second.max(1);
        self
    }

    pub fn is_playing(&self) -> bool {
        self.state
            .lock()
            .ticker
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    fn stop_ticker(state: &mut Playhead) {
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        Self::stop_ticker(&mut self.state.lock());
    }
}

#[async_trait]
impl MediaEngine for SimulatedEngine {
    fn load(&self, payload: Bytes) -> Result<()> {
        if payload.is_empty() {
            return Err(BridgeError::OperationFailed("empty payload".to_string()));
        }
        let mut state = self.state.lock();
        Self::stop_ticker(&mut state);
        state.duration = Some(payload.len() as f64 * 8.0 / self.bitrate_bps as f64);
        state.position = 0.0;
        state.source = Some(payload);
        debug!(duration = ?state.duration, "Payload loaded");
        Ok(())
    }

    fn has_source(&self) -> bool {
        self.state.lock().source.is_some()
    }

    fn seek(&self, position: f64) {
        let mut state = self.state.lock();
        let end = state.duration.unwrap_or(f64::MAX);
        state.position = position.clamp(0.0, end);
    }

    fn current_time(&self) -> f64 {
        self.state.lock().position
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    async fn play(&self) -> Result<()> {
        let mut guard = self.state.lock();
        if guard.source.is_none() {
            return Err(BridgeError::OperationFailed("no source loaded".to_string()));
        }
        if guard.ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        let period = self.tick_period;
        guard.ticker = Some(core_async::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticks.tick().await;
            let mut last = Instant::now();

            loop {
                ticks.tick().await;
                let now = Instant::now();
                let elapsed = now.duration_since(last).as_secs_f64();
                last = now;

                let (update, callback, finished) = {
                    let mut state = state.lock();
                    let end = state.duration.unwrap_or(f64::MAX);
                    state.position = (state.position + elapsed).min(end);
                    let update = TimeUpdate {
                        current_time: state.position,
                        duration: state.duration,
                    };
                    (update, state.callback.clone(), state.position >= end)
                };

                if let Some(callback) = callback {
                    callback(update);
                }
                if finished {
                    debug!("Reached end of payload");
                    break;
                }
            }
        }));
        Ok(())
    }

    fn pause(&self) {
        Self::stop_ticker(&mut self.state.lock());
    }

    fn set_time_update_callback(&self, callback: TimeUpdateCallback) {
        self.state.lock().callback = Some(Arc::from(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn payload(seconds: usize) -> Bytes {
        // 8 bits per byte at 8 bps: one byte per second.
        Bytes::from(vec![0u8; seconds])
    }

    #[tokio::test]
    async fn test_duration_follows_bitrate() {
        let engine = SimulatedEngine::new().with_bitrate(8);
        engine.load(payload(90)).unwrap();
        assert_eq!(engine.duration(), Some(90.0));
    }

    #[tokio::test]
    async fn test_play_requires_source() {
        let engine = SimulatedEngine::new();
        assert!(engine.play().await.is_err());
        assert!(engine.load(Bytes::new()).is_err());
    }

    #[tokio::test]
    async fn test_ticks_advance_while_playing_only() {
        let engine = SimulatedEngine::new()
            .with_bitrate(8)
            .with_tick_period(Duration::from_millis(10));
        engine.load(payload(60)).unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        engine.set_time_update_callback(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        engine.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        engine.pause();

        let after_pause = ticks.load(Ordering::SeqCst);
        assert!(after_pause > 0);
        assert!(engine.current_time() > 0.0);
        assert!(!engine.is_playing());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_pause);
    }

    #[tokio::test]
    async fn test_seek_is_clamped_to_duration() {
        let engine = SimulatedEngine::new().with_bitrate(8);
        engine.load(payload(30)).unwrap();

        engine.seek(12.5);
        assert_eq!(engine.current_time(), 12.5);
        engine.seek(500.0);
        assert_eq!(engine.current_time(), 30.0);
        engine.seek(-1.0);
        assert_eq!(engine.current_time(), 0.0);
    }

    #[tokio::test]
    async fn test_playback_stops_at_end() {
        let engine = SimulatedEngine::new()
            .with_bitrate(8)
            .with_tick_period(Duration::from_millis(5));
        engine.load(payload(1)).unwrap();
        engine.seek(0.99);

        engine.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(engine.current_time(), 1.0);
        assert!(!engine.is_playing());
    }
}
