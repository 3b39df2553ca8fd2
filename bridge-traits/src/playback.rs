//! Media engine bridge.
//!
//! The engine is the host's decode/playback primitive. A controller owns
//! exactly one engine, loads a payload into it once, and then drives it with
//! play/pause/seek while listening to its time-advance ticks.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Time-advance tick reported by a playing engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUpdate {
    /// Elapsed playback time in seconds.
    pub current_time: f64,
    /// Total length in seconds, once the engine knows it.
    pub duration: Option<f64>,
}

/// Callback invoked on each time-advance tick.
pub type TimeUpdateCallback = Box<dyn Fn(TimeUpdate) + Send + Sync>;

/// Host playback primitive.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Configure the engine against an in-memory payload.
    fn load(&self, payload: Bytes) -> Result<()>;

    /// Whether a payload has been loaded.
    fn has_source(&self) -> bool;

    /// Move the playhead to `position` seconds.
    fn seek(&self, position: f64);

    fn current_time(&self) -> f64;

    fn duration(&self) -> Option<f64>;

    /// Start or resume playback. Resolves once audio is actually running.
    async fn play(&self) -> Result<()>;

    /// Pause playback. Never fails and never suspends.
    fn pause(&self);

    /// Register the tick listener, replacing any previous one.
    fn set_time_update_callback(&self, callback: TimeUpdateCallback);
}
