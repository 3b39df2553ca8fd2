//! # Offline Track Playback
//!
//! Caches remote audio tracks on the device and plays them back.
//!
//! ## Overview
//!
//! This crate handles:
//! - The per-track cache and playback lifecycle ([`TrackController`])
//! - Download gating behind a user confirmation
//! - Position persistence and resume
//! - Single active playback across tracks ([`PlaybackCoordinator`])
//!
//! Storage comes from `core-store`; the downloader, media engine and prompt
//! are host bridges from `bridge-traits`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let ctx = PlayerContext::new(config, downloaders, prompt);
//! let coordinator = PlaybackCoordinator::new();
//!
//! let track = TrackController::new(TrackInfo::new("intro", "Intro", url), engine, &ctx);
//! coordinator.attach(&track);
//! track.initialize().await?;
//!
//! if track.pending_download() {
//!     track.request_download().await?;
//! }
//! track.toggle().await?;
//! ```

pub mod context;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod state;
pub mod track;
pub mod traits;
pub mod view;

pub use context::PlayerContext;
pub use controller::{DownloadOutcome, TrackController};
pub use coordinator::PlaybackCoordinator;
pub use error::{PlaybackError, Result};
pub use format::{human_readable_time, time_display};
pub use state::TrackState;
pub use track::TrackInfo;
pub use traits::PlaybackListener;
pub use view::{Controls, TrackView, PAUSE_SYMBOL, PLAY_SYMBOL};
