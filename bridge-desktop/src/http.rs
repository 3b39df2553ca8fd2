//! HTTP downloader using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    DownloadProgress, Downloader, DownloaderFactory, ProgressCallback,
};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("offline-tracks/", env!("CARGO_PKG_VERSION"));

/// Builds [`ReqwestDownloader`]s that share one connection pool.
#[derive(Clone)]
pub struct ReqwestDownloaderFactory {
    client: Client,
}

impl ReqwestDownloaderFactory {
    /// Factory with a 10 second connect timeout and no overall timeout;
    /// the controller applies its own download limit.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BridgeError::NotAvailable(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl DownloaderFactory for ReqwestDownloaderFactory {
    fn create(&self, url: &str) -> Arc<dyn Downloader> {
        Arc::new(ReqwestDownloader {
            client: self.client.clone(),
            url: url.to_string(),
        })
    }
}

/// Full-body GET of one URL, streamed so progress can be reported.
///
/// Progress is computable when the response carries `Content-Length`.
/// Dropping the fetch future drops the response and closes the connection.
pub struct ReqwestDownloader {
    client: Client,
    url: String,
}

#[async_trait]
impl Downloader for ReqwestDownloader {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, on_progress: ProgressCallback) -> Result<Bytes> {
        debug!(url = %self.url, "Starting download");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Download request failed");
            if e.is_connect() {
                BridgeError::Transport(format!("Connection failed: {}", e))
            } else {
                BridgeError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "Download rejected");
            return Err(BridgeError::Transport(format!(
                "HTTP {} for {}",
                status.as_u16(),
                self.url
            )));
        }

        let total = response.content_length();
        let mut body = BytesMut::with_capacity(total.unwrap_or(0).min(64 * 1024 * 1024) as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                warn!(url = %self.url, error = %e, "Download interrupted");
                BridgeError::Transport(format!("Body interrupted: {}", e))
            })?;
            body.extend_from_slice(&chunk);
            on_progress(DownloadProgress::new(body.len() as u64, total));
        }

        if let Some(expected) = total {
            if body.len() as u64 != expected {
                return Err(BridgeError::Transport(format!(
                    "Body truncated: {} of {} bytes",
                    body.len(),
                    expected
                )));
            }
        }

        debug!(url = %self.url, bytes = body.len(), "Download finished");
        Ok(body.freeze())
    }
}
