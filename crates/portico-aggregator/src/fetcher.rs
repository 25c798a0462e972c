//! Retrieval of upstream document text.

use std::time::Duration;

use async_trait::async_trait;
use portico_spec::RawDocument;
use reqwest::Client;

use crate::error::FetchError;
use crate::registry::SourceSpec;

/// Retrieves the raw document for one source.
///
/// Implementations must not fail the pipeline: any problem is logged and
/// reported as `None`.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, source: &SourceSpec) -> Option<RawDocument>;
}

/// HTTP client settings for document retrieval.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout, including reading the body.
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Fetches documents with a single GET per source, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, source: &SourceSpec) -> Result<String, FetchError> {
        let response = self
            .client
            .get(source.location.clone())
            .header(reqwest::header::ACCEPT, "application/json, application/yaml;q=0.9, */*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceSpec) -> Option<RawDocument> {
        match self.try_fetch(source).await {
            Ok(text) => Some(RawDocument {
                source_location: source.location.clone(),
                text,
            }),
            Err(e) => {
                portico_telemetry::log_source_fetch_failed!(
                    source = %source.location,
                    error = %e,
                    "skipping upstream document"
                );
                None
            }
        }
    }
}
