//! SerpAPI HTTP client.

use std::time::Duration;

use itinerary::{
    FlightQuery, FlightSearchProvider, LegQuery, LegResults, LegSearchProvider, ProviderError,
};
use tracing::{debug, error};

use crate::params::{Params, SearchSettings};
use crate::wire::ApiResponse;

/// Public SerpAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for creating a SerpAPI client.
#[derive(Debug, Clone)]
pub struct SerpApiClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    settings: SearchSettings,
}

impl SerpApiClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            settings: SearchSettings::default(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<SerpApiClient, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(SerpApiClient {
            client,
            api_key: self.api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            settings: self.settings,
        })
    }
}

/// Google Flights search through SerpAPI.
pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    settings: SearchSettings,
}

impl SerpApiClient {
    pub fn builder(api_key: impl Into<String>) -> SerpApiClientBuilder {
        SerpApiClientBuilder::new(api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/search.json", self.base_url)
    }

    async fn run(&self, params: Params) -> Result<LegResults, ProviderError> {
        debug!(params = ?params.pairs(), "sending search request");

        let response = self
            .client
            .get(self.endpoint())
            .query(params.pairs())
            .query(&[("api_key", self.api_key.as_str())])
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "search request failed");
                ProviderError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "search API returned an error status");
            return Err(ProviderError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        api_response.into_results()
    }
}

impl std::fmt::Display for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "serpapi({}, currency={})", self.base_url, self.settings.currency)
    }
}

impl LegSearchProvider for SerpApiClient {
    async fn search_leg(&self, query: LegQuery<'_>) -> Result<LegResults, ProviderError> {
        let params = Params::multi_city(&query, &self.settings)?;
        self.run(params).await
    }
}

impl FlightSearchProvider for SerpApiClient {
    async fn search_flights(&self, query: &FlightQuery) -> Result<LegResults, ProviderError> {
        let params = Params::flights(query, &self.settings);
        self.run(params).await
    }
}
