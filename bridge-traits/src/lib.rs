//! # Host Bridge Traits
//!
//! Contracts between the offline track cache core and the host that embeds it.
//!
//! ## Overview
//!
//! The core owns the caching and playback state machine. Everything it needs
//! from the outside world is expressed here as a trait, so each host (desktop,
//! mobile, web) can plug in its own implementation and tests can plug in mocks.
//!
//! ## Traits
//!
//! - [`Downloader`](download::Downloader) / [`DownloaderFactory`](download::DownloaderFactory):
//!   full-body fetch of a remote payload with progress events
//! - [`MediaEngine`](playback::MediaEngine): the decode/playback primitive a
//!   track controller drives
//! - [`ConfirmationPrompt`](prompt::ConfirmationPrompt): asynchronous yes/no
//!   prompt gating every download
//! - [`LoggerSink`](logging::LoggerSink): forwards structured logs to the host
//!
//! ## Implementations
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//!
//! ## Error Handling
//!
//! All bridge traits report failures as [`BridgeError`](error::BridgeError).
//! Implementations convert their platform errors into it and keep messages
//! actionable (URL, status code, path).
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync` so implementations can be shared across
//! async tasks behind an `Arc`.

pub mod download;
pub mod error;
pub mod logging;
pub mod playback;
pub mod prompt;

pub use error::BridgeError;

pub use download::{DownloadProgress, Downloader, DownloaderFactory, ProgressCallback};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{MediaEngine, TimeUpdate, TimeUpdateCallback};
pub use prompt::ConfirmationPrompt;
