//! HTTP download abstraction for fetching externally-hosted images.
//!
//! The relocator pulls generated images off the provider's ephemeral
//! hosting through this trait. The abstraction exists so the download
//! step can be mocked in tests without real network requests; the
//! default implementation wraps reqwest.

use std::time::Duration;

use async_trait::async_trait;
use crate::Error;

/// A generic trait for fetching raw bytes over HTTP with a bounded timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, Error>;
}

#[derive(Clone)]
pub struct DefaultHttpFetcher {
    client: reqwest::Client,
}

impl DefaultHttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DefaultHttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetcher for DefaultHttpFetcher {
    async fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
