//! # Playback Error Types
//!
//! Errors surfaced by track controllers and the playback coordinator.

use crate::state::TrackState;
use bridge_traits::BridgeError;
use core_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while caching or playing a track.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// `play()` was called before a payload was configured on the engine.
    #[error("No playback source configured")]
    NoSourceConfigured,

    /// The media engine rejected a payload or failed to start.
    #[error("Media engine error: {0}")]
    EngineFailed(String),

    // ========================================================================
    // Download Errors
    // ========================================================================
    /// The downloader rejected (network error, HTTP error, aborted body).
    #[error("Download failed: {0}")]
    TransportFailed(String),

    /// The in-flight download was cancelled by the embedder.
    #[error("Download cancelled")]
    DownloadCancelled,

    /// The download did not finish within the configured limit.
    #[error("Download timed out after {0:?}")]
    DownloadTimedOut(Duration),

    // ========================================================================
    // Storage Errors
    // ========================================================================
    #[error(transparent)]
    Store(#[from] StoreError),

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The requested operation needs a state change the lifecycle forbids.
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: TrackState, to: TrackState },

    /// An operation needed the store before `initialize()` completed.
    #[error("Track controller not initialized")]
    NotInitialized,
}

impl PlaybackError {
    /// Whether a fresh user request may succeed where this one failed.
    ///
    /// Download failures leave the track in `pending-download`, so another
    /// confirmed request starts over cleanly.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlaybackError::TransportFailed(_)
            | PlaybackError::DownloadCancelled
            | PlaybackError::DownloadTimedOut(_) => true,
            PlaybackError::Store(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether the error came from moving bytes over the wire.
    pub fn is_download_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::TransportFailed(_)
                | PlaybackError::DownloadCancelled
                | PlaybackError::DownloadTimedOut(_)
        )
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(err: BridgeError) -> Self {
        PlaybackError::TransportFailed(err.to_string())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
