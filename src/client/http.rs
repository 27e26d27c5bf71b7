//! HTTP progress source
//!
//! Issues `GET {base_url}{path}` with no parameters and decodes
//! `{"progress": <number>}`. Transport errors, non-success statuses and
//! malformed bodies all surface as poll failures.

use super::ProgressSource;
use crate::config::PollerConfig;
use crate::error::{PollerError, Result};
use crate::progress::ProgressReading;
use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

/// Progress source backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpProgressSource {
    client: Client,
    url: String,
}

impl HttpProgressSource {
    /// Create a source for the endpoint described by `config`
    pub fn new(config: &PollerConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PollerError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.endpoint(),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ProgressSource for HttpProgressSource {
    async fn fetch(&self) -> Result<ProgressReading> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PollerError::request(&self.url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollerError::status(&self.url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PollerError::request(&self.url, e.to_string()))?;
        let reading: ProgressReading = serde_json::from_slice(&body)?;

        trace!(url = %self.url, progress = reading.progress, "Fetched progress");
        Ok(reading)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
