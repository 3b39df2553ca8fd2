//! # Desktop Bridge Implementations
//!
//! Default implementations of the host bridges for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `ReqwestDownloaderFactory` / `ReqwestDownloader`: streamed HTTP downloads
//!   with `Content-Length` based progress
//! - `SimulatedEngine`: clock-driven media engine for headless players
//! - `TerminalPrompt`, `AutoConfirm`, `ScriptedPrompt`: download confirmation
//! - [`default_store_dir`]: per-user data directory for the track store
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{default_store_dir, ReqwestDownloaderFactory, TerminalPrompt};
//!
//! let config = PlayerConfig::builder()
//!     .store_dir(default_store_dir().unwrap())
//!     .build()?;
//! let ctx = PlayerContext::new(
//!     config,
//!     Arc::new(ReqwestDownloaderFactory::new()?),
//!     Arc::new(TerminalPrompt),
//! );
//! ```

mod engine;
mod http;
mod prompt;

use std::path::PathBuf;

pub use engine::SimulatedEngine;
pub use http::{ReqwestDownloader, ReqwestDownloaderFactory};
pub use prompt::{AutoConfirm, ScriptedPrompt, TerminalPrompt};

/// Directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "offline-tracks";

/// Per-user directory for the track store, e.g.
/// `~/.local/share/offline-tracks` on Linux.
///
/// `None` when the platform exposes no data directory.
pub fn default_store_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME))
}
