use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use reqwest::{Client, Url};
use tokio::time;

use super::{
    error::{FeedError, Result},
    models::{DepartureDocument, FeedSnapshot},
};

const DEFAULT_BASE_URL: &str = "https://api.trafiklab.se/sl/realtid/GetDpsDepartures";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the feed HTTP client.
#[derive(Clone, Debug)]
pub struct FeedClientConfig {
    base_url: String,
    api_key: String,
    station_id: String,
    timeout: time::Duration,
}

impl FeedClientConfig {
    pub fn new(api_key: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            station_id: station_id.into(),
            timeout: time::Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Returns the feed endpoint base url.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the station identifier passed as the `siteid` query parameter.
    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// Returns the per-request timeout.
    ///
    /// A hung connection must not be able to starve the poll loop; the
    /// default keeps one fetch within a single poll period.
    pub fn timeout(&self) -> time::Duration {
        self.timeout
    }

    /// Sets the feed endpoint base url.
    ///
    /// Default: the trafiklab.se SL realtime departures endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    ///
    /// Default: `10` seconds
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = time::Duration::from_secs(secs);
        self
    }
}

/// Source of parsed feed snapshots.
///
/// [`FeedRepository`](super::FeedRepository) is generic over this seam so the
/// last-known-good logic can be exercised without a network.
#[async_trait]
pub trait FetchDepartures: Send + Sync {
    /// Performs exactly one fetch and parses it in full.
    async fn fetch(&self) -> Result<Arc<FeedSnapshot>>;
}

/// HTTP client for the departure feed endpoint.
pub struct FeedClient {
    url: Url,
    client: Client,
}

impl FeedClient {
    pub fn new(config: FeedClientConfig) -> Result<Self> {
        let url = Url::parse_with_params(
            config.base_url(),
            &[
                ("key", config.api_key.as_str()),
                ("siteid", config.station_id.as_str()),
            ],
        )
        .map_err(|e| FeedError::UrlParse(e.to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(FeedError::Fetch)?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl FetchDepartures for FeedClient {
    async fn fetch(&self) -> Result<Arc<FeedSnapshot>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(FeedError::Fetch)?
            .error_for_status()
            .map_err(FeedError::Fetch)?;

        let body = response.text().await.map_err(FeedError::Fetch)?;

        let document: DepartureDocument =
            serde_json::from_str(&body).map_err(FeedError::Parse)?;

        Ok(document.into_snapshot(Local::now().naive_local()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let config = FeedClientConfig::new("key", "9526").with_base_url("not a url");
        assert!(matches!(
            FeedClient::new(config),
            Err(FeedError::UrlParse(_))
        ));
    }

    #[test]
    fn builds_url_with_credentials_as_query_params() {
        let config = FeedClientConfig::new("secret", "9526");
        let client = FeedClient::new(config).unwrap();

        assert_eq!(
            client.url.as_str(),
            "https://api.trafiklab.se/sl/realtid/GetDpsDepartures?key=secret&siteid=9526"
        );
    }
}
