use serde::{Deserialize, Serialize};

/// Identity of one cacheable track.
///
/// `key` addresses both the stored payload and the stored position, so two
/// controllers with the same key share cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub key: String,
    /// Shown to the user, including in the download prompt.
    pub label: String,
    pub url: String,
}

impl TrackInfo {
    /// Builds a track description, trimming surrounding whitespace from
    /// every field.
    pub fn new(key: impl AsRef<str>, label: impl AsRef<str>, url: impl AsRef<str>) -> Self {
        Self {
            key: key.as_ref().trim().to_string(),
            label: label.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
        }
    }
}
