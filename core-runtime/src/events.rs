//! # Event Bus System
//!
//! Broadcasts track lifecycle events to any number of observers (UI layers,
//! loggers, tests) over `core_async::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps the domain enums; today that is
//!   [`TrackEvent`].
//! - **EventBus**: cloneable publisher handle.
//! - **EventStream**: receiver wrapper with optional filtering.
//!
//! The bus is an observation channel. The single-active-playback rule is
//! enforced by direct listener calls inside `core-playback`, so a lagging or
//! absent subscriber never affects playback correctness.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, TrackEvent};
//!
//! # core_async::runtime::block_on(async {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Track(TrackEvent::PlayStarted {
//!     key: "intro".to_string(),
//! }))
//! .ok();
//!
//! assert_eq!(rx.recv().await.unwrap().description(), "Playback started");
//! # });
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Position
//!   ticks are frequent, so slow consumers should expect this and carry on.
//! - **`RecvError::Closed`**: every sender was dropped; treat as shutdown.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Track(TrackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Track(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Track(TrackEvent::DownloadFailed { recoverable, .. }) => {
                if *recoverable {
                    EventSeverity::Warning
                } else {
                    EventSeverity::Error
                }
            }
            CoreEvent::Track(TrackEvent::PlayStarted { .. })
            | CoreEvent::Track(TrackEvent::Paused { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// Key of the track the event concerns.
    pub fn track_key(&self) -> &str {
        match self {
            CoreEvent::Track(e) => e.key(),
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Track Events
// ============================================================================

/// Events emitted by a track controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum TrackEvent {
    /// The controller moved between lifecycle states. States are reported by
    /// their attribute name (`pending-download`, `playing`, ...).
    StateChanged {
        key: String,
        from: String,
        to: String,
    },
    /// Latest progress of an in-flight download.
    DownloadProgress {
        key: String,
        loaded: u64,
        total: u64,
        computable: bool,
    },
    /// Playback advanced.
    PositionChanged {
        key: String,
        current: f64,
        duration: Option<f64>,
        /// Rendered `"<current> / <duration>"` text.
        display: String,
    },
    PlayStarted {
        key: String,
    },
    Paused {
        key: String,
    },
    /// A download attempt ended without a stored payload.
    DownloadFailed {
        key: String,
        message: String,
        /// Whether a fresh download request may succeed.
        recoverable: bool,
    },
}

impl TrackEvent {
    fn description(&self) -> &str {
        match self {
            TrackEvent::StateChanged { .. } => "Track state changed",
            TrackEvent::DownloadProgress { .. } => "Download in progress",
            TrackEvent::PositionChanged { .. } => "Playback position changed",
            TrackEvent::PlayStarted { .. } => "Playback started",
            TrackEvent::Paused { .. } => "Playback paused",
            TrackEvent::DownloadFailed { .. } => "Download failed",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TrackEvent::StateChanged { key, .. }
            | TrackEvent::DownloadProgress { key, .. }
            | TrackEvent::PositionChanged { key, .. }
            | TrackEvent::PlayStarted { key }
            | TrackEvent::Paused { key }
            | TrackEvent::DownloadFailed { key, .. } => key,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Cloneable publisher over a broadcast channel.
///
/// Every clone publishes into the same channel. Subscribers only see events
/// emitted after they subscribed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per
    /// subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. `PlayerConfig::validate` rejects that
    /// value before a bus is ever built from configuration.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Subscribes and wraps the receiver in an [`EventStream`].
    pub fn stream(&self) -> EventStream {
        EventStream::new(self.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Restrict the stream to events about one track.
    pub fn for_track(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.filter(move |event| event.track_key() == key)
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv). Returns `None` when no
    /// matching event is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn matches(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
