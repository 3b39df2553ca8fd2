//! # Player Configuration
//!
//! [`PlayerConfig`] gathers everything a track controller needs besides its
//! bridges: where the store lives, what the collections are called, how the
//! download prompt reads, persistence and timeout policy, and the injected
//! [`Theme`].
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::{PersistencePolicy, PlayerConfig};
//! use std::time::Duration;
//!
//! let config = PlayerConfig::builder()
//!     .store_name("podcasts")
//!     .download_timeout(Duration::from_secs(120))
//!     .payload_persistence(PersistencePolicy::AwaitCommit)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.store_version, 1);
//! assert!(config.confirm_message("Episode 1").contains("Episode 1"));
//! ```
//!
//! ## Error Handling
//!
//! `build()` validates eagerly and returns [`Error::Config`] with an
//! actionable message:
//!
//! ```
//! use core_runtime::config::PlayerConfig;
//!
//! let err = PlayerConfig::builder().store_version(0).build().unwrap_err();
//! assert!(err.to_string().contains("version"));
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use crate::theme::Theme;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORE_NAME: &str = "offline-tracks";
pub const DEFAULT_STORE_VERSION: u32 = 1;
pub const DEFAULT_BLOBS_COLLECTION: &str = "blobs";
pub const DEFAULT_POSITIONS_COLLECTION: &str = "positions";

/// Placeholder substituted with the track label in the confirm message.
pub const LABEL_PLACEHOLDER: &str = "{label}";

pub const DEFAULT_CONFIRM_TEMPLATE: &str = "Do you want to download this file?\n\n\
     \u{ab} {label} \u{bb}\n\n\
     Downloading over a mobile network is not recommended.";

/// When a downloaded payload counts as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistencePolicy {
    /// Playback setup waits for the blob write to commit. A failed write
    /// sends the track back to `pending-download`.
    #[default]
    AwaitCommit,
    /// The blob write runs in the background and playback setup proceeds
    /// immediately. A failed write is only logged.
    FireAndForget,
}

/// Configuration shared by every controller of a player.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub store_name: String,
    /// Schema version; raising it creates missing collections.
    pub store_version: u32,
    /// Directory holding the store file. `None` keeps the store in memory.
    pub store_dir: Option<PathBuf>,
    pub blobs_collection: String,
    pub positions_collection: String,
    pub confirm_message_template: String,
    /// Upper bound for one download attempt. `None` waits indefinitely.
    pub download_timeout: Option<Duration>,
    pub payload_persistence: PersistencePolicy,
    pub event_capacity: usize,
    pub theme: Theme,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            store_version: DEFAULT_STORE_VERSION,
            store_dir: None,
            blobs_collection: DEFAULT_BLOBS_COLLECTION.to_string(),
            positions_collection: DEFAULT_POSITIONS_COLLECTION.to_string(),
            confirm_message_template: DEFAULT_CONFIRM_TEMPLATE.to_string(),
            download_timeout: None,
            payload_persistence: PersistencePolicy::default(),
            event_capacity: DEFAULT_EVENT_BUFFER_SIZE,
            theme: Theme::default(),
        }
    }
}

impl PlayerConfig {
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Collections the store must provide, blobs first.
    pub fn collections(&self) -> [&str; 2] {
        [&self.blobs_collection, &self.positions_collection]
    }

    /// Download prompt text for `label`.
    pub fn confirm_message(&self, label: &str) -> String {
        self.confirm_message_template
            .replace(LABEL_PLACEHOLDER, label)
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - store name is not blank and version is at least 1
    /// - collection names are distinct, non-empty identifiers
    /// - the confirm template mentions `{label}`
    /// - timeout and event capacity are non-zero
    /// - the theme is complete
    pub fn validate(&self) -> Result<()> {
        if self.store_name.trim().is_empty() {
            return Err(Error::Config("Store name cannot be empty".to_string()));
        }

        if self.store_version == 0 {
            return Err(Error::Config(
                "Store version must be at least 1".to_string(),
            ));
        }

        for name in self.collections() {
            if !is_identifier(name) {
                return Err(Error::Config(format!(
                    "Collection name '{}' must be a non-empty identifier ([A-Za-z_][A-Za-z0-9_]*)",
                    name
                )));
            }
        }

        if self.blobs_collection == self.positions_collection {
            return Err(Error::Config(
                "Blob and position collections must be distinct".to_string(),
            ));
        }

        if !self.confirm_message_template.contains(LABEL_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "Confirm message template must contain '{}'",
                LABEL_PLACEHOLDER
            )));
        }

        if self.download_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Download timeout must be greater than zero; use None to disable it".to_string(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(Error::Config(
                "Event capacity must be greater than 0".to_string(),
            ));
        }

        self.theme
            .validate()
            .map_err(|e| Error::Config(format!("Invalid theme: {}", e)))
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builder for [`PlayerConfig`]. Unset fields keep their defaults.
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.config.store_name = name.into();
        self
    }

    pub fn store_version(mut self, version: u32) -> Self {
        self.config.store_version = version;
        self
    }

    /// Persist the store under `dir` instead of in memory.
    pub fn store_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.store_dir = Some(dir.into());
        self
    }

    pub fn collections(mut self, blobs: impl Into<String>, positions: impl Into<String>) -> Self {
        self.config.blobs_collection = blobs.into();
        self.config.positions_collection = positions.into();
        self
    }

    pub fn confirm_message_template(mut self, template: impl Into<String>) -> Self {
        self.config.confirm_message_template = template.into();
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = Some(timeout);
        self
    }

    pub fn payload_persistence(mut self, policy: PersistencePolicy) -> Self {
        self.config.payload_persistence = policy;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn build(self) -> Result<PlayerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
