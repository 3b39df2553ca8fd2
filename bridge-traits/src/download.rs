//! Downloader bridge.
//!
//! A downloader performs one full fetch of a remote resource, reporting
//! progress as bytes arrive and resolving with the complete payload. Downloads
//! are atomic: a partial body is never surfaced to the caller.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Snapshot of an in-flight download.
///
/// `total` is only meaningful when `computable` is `true`, i.e. when the
/// remote end announced the body length up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub loaded: u64,
    pub total: u64,
    pub computable: bool,
}

impl DownloadProgress {
    /// Build a progress snapshot from the bytes received so far and the
    /// announced length, if any.
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) => Self {
                loaded,
                total,
                computable: true,
            },
            None => Self {
                loaded,
                total: 0,
                computable: false,
            },
        }
    }

    /// Completed fraction in `0.0..=1.0`, when computable.
    pub fn fraction(&self) -> Option<f64> {
        if !self.computable || self.total == 0 {
            return None;
        }
        Some((self.loaded as f64 / self.total as f64).min(1.0))
    }
}

/// Callback invoked on every progress event.
pub type ProgressCallback = Arc<dyn Fn(DownloadProgress) + Send + Sync>;

/// Full-body fetcher bound to a single URL.
///
/// Dropping the future returned by [`fetch`](Downloader::fetch) must abort the
/// transfer; callers rely on this to cancel downloads.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Remote location this downloader is bound to.
    fn url(&self) -> &str;

    /// Fetch the whole resource, calling `on_progress` as data arrives.
    async fn fetch(&self, on_progress: ProgressCallback) -> Result<Bytes>;
}

/// Creates downloaders on demand.
///
/// Controllers create a downloader lazily when they discover a missing
/// payload and discard it once the fetch resolves.
pub trait DownloaderFactory: Send + Sync {
    fn create(&self, url: &str) -> Arc<dyn Downloader>;
}

impl<F> DownloaderFactory for F
where
    F: Fn(&str) -> Arc<dyn Downloader> + Send + Sync,
{
    fn create(&self, url: &str) -> Arc<dyn Downloader> {
        self(url)
    }
}
