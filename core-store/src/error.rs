use thiserror::Error;

/// Errors raised by the persistent store.
#[derive(Error, Debug)]
pub enum StoreError {
    // ========================================================================
    // Open Errors
    // ========================================================================
    /// The backing database could not be opened or upgraded.
    #[error("Store '{name}' unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error("Invalid store version {0}: versions start at 1")]
    InvalidVersion(u32),

    #[error("Invalid collection name '{0}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidCollection(String),

    /// The collection was never created by any `open` of this store.
    #[error("Unknown collection '{0}'")]
    UnknownCollection(String),

    // ========================================================================
    // Transaction Errors
    // ========================================================================
    #[error("Read from '{collection}' failed: {reason}")]
    ReadFailed { collection: String, reason: String },

    #[error("Write to '{collection}' failed: {reason}")]
    WriteFailed { collection: String, reason: String },
}

impl StoreError {
    /// Transaction-level failures; retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::ReadFailed { .. } | StoreError::WriteFailed { .. }
        )
    }

    pub(crate) fn unavailable(name: &str, reason: impl std::fmt::Display) -> Self {
        StoreError::Unavailable {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
