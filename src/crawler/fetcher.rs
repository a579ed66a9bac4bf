//! Document downloader
//!
//! This module handles the HTTP side of retrieving documents:
//! - Building the HTTP client shared by the page engine and the downloader
//! - Skipping documents that are already on disk
//! - Streaming response bodies to disk without buffering them in memory

use crate::config::BrowserConfig;
use crate::{LtcError, Result};
use reqwest::Client;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Result of a fetch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The document was downloaded
    Downloaded {
        /// Size of the stored body
        bytes: u64,
    },

    /// A file already existed at the destination; nothing was requested
    AlreadyPresent,
}

impl FetchOutcome {
    pub fn was_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// Only the connection phase is bounded (by the launch timeout); a slow but
/// live transfer is never cut off.
///
/// # Example
///
/// ```no_run
/// use ltc_reports::config::BrowserConfig;
/// use ltc_reports::crawler::build_http_client;
///
/// let client = build_http_client(&BrowserConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &BrowserConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.launch_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads documents to disk, skipping ones already present
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `href` into `destination` unless a file is already there
    ///
    /// The body is streamed into `<destination>.part` (truncating any leftover
    /// from an interrupted download) and renamed into place once complete, so
    /// the destination only ever holds whole documents.
    pub async fn fetch(&self, href: &str, destination: &Path) -> Result<FetchOutcome> {
        if destination.exists() {
            tracing::debug!(
                "Skipping already retrieved file {}",
                destination.display()
            );
            return Ok(FetchOutcome::AlreadyPresent);
        }

        tracing::debug!("retrieving {} ({})", destination.display(), href);

        let mut response = self
            .client
            .get(href)
            .send()
            .await
            .map_err(|source| LtcError::Http {
                url: href.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LtcError::HttpStatus {
                url: href.to_string(),
                status: status.as_u16(),
            });
        }

        let partial = partial_path(destination);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut bytes = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(|source| LtcError::Http {
            url: href.to_string(),
            source,
        })? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }

        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, destination).await?;

        tracing::trace!("Stored {} bytes at {}", bytes, destination.display());
        Ok(FetchOutcome::Downloaded { bytes })
    }
}

/// Sibling path an in-flight download is written to
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
