//! Listener contract between controllers and whoever coordinates them.

use crate::controller::TrackController;
use std::sync::Arc;

/// Receives playback notifications from the controllers it is attached to.
///
/// Controllers call listeners synchronously and without holding any internal
/// lock, so a listener may call back into the notifying controller or into
/// other controllers (e.g. to pause them).
pub trait PlaybackListener: Send + Sync {
    /// `track` has started playing. Called before `track` reports
    /// `playing`, so a listener that pauses other tracks here guarantees no
    /// two tracks are ever observed playing together.
    fn on_play_started(&self, track: &Arc<TrackController>);

    /// `track` was paused.
    fn on_paused(&self, _track: &Arc<TrackController>) {}
}
