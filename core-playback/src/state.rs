//! Track lifecycle state.
//!
//! ```text
//! constructed -> initialized -> pending-download -> downloading -> downloaded
//!                           \________________________________________/ |
//!                                                                      v
//!                                  paused <-> loading -> playing -> paused
//! ```
//!
//! A controller is in exactly one state at a time. Every change goes through
//! [`TrackState::can_transition_to`]; anything not listed there is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackState {
    /// Set at construction, before any I/O.
    Constructed,
    /// Store opened and collections bound.
    Initialized,
    /// No payload cached; waiting for a confirmed download request.
    PendingDownload,
    /// Fetch in flight.
    Downloading,
    /// Payload configured on the engine and position restored.
    Downloaded,
    /// Engine asked to start; waiting for audio to actually run.
    Loading,
    Playing,
    Paused,
}

impl TrackState {
    pub const ALL: [TrackState; 8] = [
        TrackState::Constructed,
        TrackState::Initialized,
        TrackState::PendingDownload,
        TrackState::Downloading,
        TrackState::Downloaded,
        TrackState::Loading,
        TrackState::Playing,
        TrackState::Paused,
    ];

    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(self, next: TrackState) -> bool {
        use TrackState::*;
        matches!(
            (self, next),
            (Constructed, Initialized)
                | (Initialized, PendingDownload)
                | (Initialized, Downloaded)
                | (PendingDownload, Downloading)
                | (Downloading, Downloaded)
                | (Downloading, PendingDownload)
                | (Downloaded, Loading)
                | (Paused, Loading)
                | (Loading, Playing)
                | (Loading, Downloaded)
                | (Loading, Paused)
                | (Playing, Paused)
        )
    }

    /// Attribute name used by hosts for styling (`pending-download`, ...).
    pub fn attribute(self) -> &'static str {
        match self {
            TrackState::Constructed => "constructed",
            TrackState::Initialized => "initialized",
            TrackState::PendingDownload => "pending-download",
            TrackState::Downloading => "downloading",
            TrackState::Downloaded => "downloaded",
            TrackState::Loading => "loading",
            TrackState::Playing => "playing",
            TrackState::Paused => "paused",
        }
    }

    /// Whether a payload is configured on the engine.
    pub fn has_payload(self) -> bool {
        matches!(
            self,
            TrackState::Downloaded | TrackState::Loading | TrackState::Playing | TrackState::Paused
        )
    }

    pub fn pending_download(self) -> bool {
        self == TrackState::PendingDownload
    }

    pub fn downloading(self) -> bool {
        self == TrackState::Downloading
    }

    pub fn downloaded(self) -> bool {
        self == TrackState::Downloaded
    }

    pub fn playing(self) -> bool {
        self == TrackState::Playing
    }

    pub fn paused(self) -> bool {
        self == TrackState::Paused
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_path_is_legal() {
        let path = [
            TrackState::Constructed,
            TrackState::Initialized,
            TrackState::PendingDownload,
            TrackState::Downloading,
            TrackState::Downloaded,
            TrackState::Loading,
            TrackState::Playing,
            TrackState::Paused,
            TrackState::Loading,
            TrackState::Playing,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn shortcuts_are_rejected() {
        assert!(!TrackState::Constructed.can_transition_to(TrackState::Downloaded));
        assert!(!TrackState::PendingDownload.can_transition_to(TrackState::Playing));
        assert!(!TrackState::Downloaded.can_transition_to(TrackState::Playing));
        assert!(!TrackState::Paused.can_transition_to(TrackState::Playing));
        assert!(!TrackState::Playing.can_transition_to(TrackState::Downloading));
    }

    #[test]
    fn no_state_transitions_to_itself() {
        for state in TrackState::ALL {
            assert!(!state.can_transition_to(state), "{state} -> {state}");
        }
    }

    #[test]
    fn flags_are_mutually_exclusive() {
        for state in TrackState::ALL {
            let flags = [
                state.pending_download(),
                state.downloading(),
                state.downloaded(),
                state.playing(),
                state.paused(),
            ];
            assert!(flags.iter().filter(|f| **f).count() <= 1);
        }
    }

    #[test]
    fn attribute_matches_serde_name() {
        for state in TrackState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.attribute()));
        }
    }
}
