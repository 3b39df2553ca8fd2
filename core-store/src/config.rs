//! Connection settings for a store.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where a store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// `<dir>/<name>.sqlite`
    Directory(PathBuf),
    /// Private in-memory database; lives as long as the store handle.
    Memory,
}

/// Settings for the SQLite pool backing a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub max_connections: u32,
    /// Maximum time to wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// SQLite busy timeout for writers contending on the same file.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// File-backed store under `dir`.
    ///
    /// ```rust,ignore
    /// let config = StoreConfig::in_dir("/var/lib/player").max_connections(2);
    /// ```
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::Directory(dir.into()),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// In-memory store. Uses a single connection, since every SQLite
    /// connection to `:memory:` sees a different database.
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// `dir` when given, memory otherwise.
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::in_dir(dir),
            None => Self::in_memory(),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Database file for the store called `name`, if file-backed.
    pub fn database_path(&self, name: &str) -> Option<PathBuf> {
        match &self.location {
            StoreLocation::Directory(dir) => Some(dir.join(format!("{}.sqlite", name))),
            StoreLocation::Memory => None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}
