//! Single-file download with size verification and fixed-delay retry.
//!
//! A file is streamed to `<name>.tmp` next to its destination and renamed
//! into place only after the body is complete and larger than the minimum
//! size. Readers of the destination directory never see a partial file
//! under its final name.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use futures::StreamExt;
use metrics::counter;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Configuration for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of attempts per file
    pub max_retries: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// HTTP request timeout (whole transfer)
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// A body must be strictly larger than this to count as complete
    pub min_file_size: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30 * 60),
            connect_timeout: Duration::from_secs(30),
            min_file_size: 1024 * 1024,
        }
    }
}

/// Errors from downloading one file.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(StatusCode),

    #[error("Body too small: {bytes} bytes (need more than {min})")]
    TooSmall { bytes: u64, min: u64 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download cancelled")]
    Cancelled,

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<DownloadError>,
    },
}

impl DownloadError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Network errors, bad statuses and short bodies may succeed on a later
    /// attempt. Local filesystem errors will not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DownloadError::Http(_) | DownloadError::Status(_) | DownloadError::TooSmall { .. }
        )
    }
}

/// Path of the in-progress file for `dest`.
pub fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Downloads files over HTTP with retry.
pub struct DownloadManager {
    client: Client,
    config: DownloadConfig,
}

impl DownloadManager {
    /// Create a new download manager with the given configuration.
    pub fn new(config: DownloadConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download `url` to `dest`, retrying transient failures.
    ///
    /// Returns the number of bytes written. The cancellation token is
    /// checked before each attempt and during the pause between attempts.
    #[instrument(skip(self, cancel), fields(file = %dest.display()))]
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, DownloadError> {
        let tmp = temp_path(dest);
        let attempts = self.config.max_retries.max(1);
        let mut last = None;

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                discard(&tmp).await;
                return Err(DownloadError::Cancelled);
            }

            debug!(url = %url, attempt, max_attempts = attempts, "Requesting file");
            let error = match self.fetch(url, &tmp).await {
                Ok(bytes) if bytes > self.config.min_file_size => {
                    if let Err(e) = fs::rename(&tmp, dest).await {
                        discard(&tmp).await;
                        return Err(DownloadError::io(dest, e));
                    }
                    info!(url = %url, size = %format_size(bytes), "Download completed");
                    return Ok(bytes);
                }
                Ok(bytes) => DownloadError::TooSmall {
                    bytes,
                    min: self.config.min_file_size,
                },
                Err(e) if !e.is_retryable() => {
                    discard(&tmp).await;
                    return Err(e);
                }
                Err(e) => e,
            };

            if attempt < attempts {
                warn!(
                    error = %error,
                    attempt,
                    max_attempts = attempts,
                    delay_secs = self.config.retry_delay.as_secs_f64(),
                    "Download failed, retrying"
                );
                counter!("download_retries_total").increment(1);

                tokio::select! {
                    _ = cancel.cancelled() => {
                        discard(&tmp).await;
                        return Err(DownloadError::Cancelled);
                    }
                    _ = tokio::time::sleep(self.config.retry_delay) => {}
                }
            }
            last = Some(error);
        }

        discard(&tmp).await;
        Err(DownloadError::Exhausted {
            attempts,
            last: Box::new(last.unwrap_or(DownloadError::Cancelled)),
        })
    }

    /// One attempt: stream the response body into `tmp`, truncating any
    /// earlier partial content.
    async fn fetch(&self, url: &str, tmp: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(DownloadError::Status(response.status()));
        }

        let mut file = File::create(tmp)
            .await
            .map_err(|e| DownloadError::io(tmp, e))?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(tmp, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| DownloadError::io(tmp, e))?;
        file.sync_all().await.map_err(|e| DownloadError::io(tmp, e))?;

        Ok(written)
    }
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove partial download");
        }
    }
}

/// Human-readable byte count, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const SUFFIXES: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / UNIT as f64;
    let mut exp = 0;
    while value >= UNIT as f64 && exp < SUFFIXES.len() - 1 {
        value /= UNIT as f64;
        exp += 1;
    }
    format!("{:.1} {}", value, SUFFIXES[exp])
}
