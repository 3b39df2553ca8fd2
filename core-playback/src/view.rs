//! Read-only snapshot of a track for rendering.

use crate::state::TrackState;
use bridge_traits::DownloadProgress;
use core_runtime::{Theme, TrackStyle};
use serde::Serialize;

pub const PLAY_SYMBOL: char = '▶';
pub const PAUSE_SYMBOL: char = '⏸';

/// Which control group a host should show under the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Controls {
    /// Nothing yet; the row itself is the download trigger.
    None,
    /// Download progress bar.
    Progress,
    /// Play/pause button and time display.
    Playback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackView {
    pub key: String,
    pub label: String,
    pub state: TrackState,
    pub controls: Controls,
    /// Symbol for the play/pause button: pause while playing, play otherwise.
    pub control_symbol: char,
    /// Last progress with a known total. Never regresses to an unknown total.
    pub progress: Option<DownloadProgress>,
    /// `"<current> / <duration>"`.
    pub time_display: String,
}

impl TrackView {
    pub(crate) fn controls_for(state: TrackState, payload_ready: bool) -> Controls {
        match state {
            TrackState::Downloading => Controls::Progress,
            _ if payload_ready => Controls::Playback,
            _ => Controls::None,
        }
    }

    pub(crate) fn symbol_for(state: TrackState) -> char {
        if state.playing() {
            PAUSE_SYMBOL
        } else {
            PLAY_SYMBOL
        }
    }

    /// Fraction of the download completed, when known.
    pub fn progress_fraction(&self) -> Option<f64> {
        self.progress.as_ref().and_then(DownloadProgress::fraction)
    }

    /// Resolve the row style from an injected theme.
    pub fn style(&self, theme: &Theme, last_in_list: bool) -> TrackStyle {
        theme.track_style(self.state.playing(), last_in_list)
    }
}
