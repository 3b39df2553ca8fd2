//! Single-active-playback coordination.

use crate::controller::TrackController;
use crate::state::TrackState;
use crate::traits::PlaybackListener;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Keeps at most one attached track playing.
///
/// The coordinator subscribes to "play started" from every track it is
/// given and pauses the previously playing one before the new one reports
/// `playing`. It does not own the tracks; its only state is a weak handle to
/// the current one.
///
/// Handoffs are serialized, so tracks started from different threads still
/// end with a single one playing: a start that was already paused by a later
/// one is ignored.
pub struct PlaybackCoordinator {
    current: Mutex<Option<Weak<TrackController>>>,
    handoff: Mutex<()>,
    self_ref: Weak<PlaybackCoordinator>,
}

impl PlaybackCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            current: Mutex::new(None),
            handoff: Mutex::new(()),
            self_ref: self_ref.clone(),
        })
    }

    /// Starts coordinating `track`.
    pub fn attach(&self, track: &Arc<TrackController>) {
        track.add_listener(self.as_listener());
    }

    /// Stops coordinating `track`; forgets it if it was current.
    pub fn detach(&self, track: &Arc<TrackController>) {
        track.remove_listener(&self.as_listener());
        let mut current = self.current.lock();
        if current
            .as_ref()
            .is_some_and(|c| std::ptr::eq(c.as_ptr(), Arc::as_ptr(track)))
        {
            *current = None;
        }
    }

    /// The track that started playing most recently, if still alive.
    pub fn current(&self) -> Option<Arc<TrackController>> {
        self.current.lock().as_ref().and_then(Weak::upgrade)
    }

    fn as_listener(&self) -> Weak<dyn PlaybackListener> {
        self.self_ref.clone()
    }
}

impl PlaybackListener for PlaybackCoordinator {
    fn on_play_started(&self, track: &Arc<TrackController>) {
        let _handoff = self.handoff.lock();
        let state = track.state();
        if !matches!(state, TrackState::Loading | TrackState::Playing) {
            debug!(key = %track.key(), %state, "Start already superseded");
            return;
        }

        // `current` is released before pausing: the paused track notifies us
        // back synchronously.
        let previous = self.current();
        if let Some(previous) = previous.filter(|p| !Arc::ptr_eq(p, track)) {
            debug!(from = %previous.key(), to = %track.key(), "Switching active track");
            if let Err(e) = previous.pause() {
                warn!(key = %previous.key(), error = %e, "Could not pause previous track");
            }
        }
        *self.current.lock() = Some(Arc::downgrade(track));
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("current", &self.current().map(|t| t.key().to_string()))
            .finish()
    }
}
