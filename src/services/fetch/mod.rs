//! Remote image download for perceptual hashing.

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use crate::types::errors::NoSignal;

/// Card artwork is small; anything larger is not an image we want.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// HTTP image fetcher with an explicit per-request timeout.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, NoSignal> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_bytes: MAX_IMAGE_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Raw bytes of `url`, or `None` on timeout, HTTP error, transport error
    /// or oversized body.
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        match self.try_fetch(url).await {
            Ok(bytes) => Some(bytes),
            Err(reason) => {
                warn!("Image fetch failed for '{url}': {reason}");
                None
            }
        }
    }

    pub async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, NoSignal> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NoSignal::Http(status.as_u16()));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(NoSignal::Decode(format!(
                    "body exceeds {} bytes",
                    self.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!("Fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}

/// One-shot fetch with its own client.
pub async fn fetch_image(url: &str, timeout: Duration) -> Option<Vec<u8>> {
    match ImageFetcher::new(timeout) {
        Ok(fetcher) => fetcher.fetch(url).await,
        Err(reason) => {
            warn!("Image fetcher unavailable: {reason}");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
