//! Configuration loading from flight-search.toml.

use std::path::Path;
use std::time::Duration;

use itinerary::{BuilderConfig, MAX_API_CALLS, Strategy};
use serde::Deserialize;
use serpapi::{DEFAULT_BASE_URL, SearchSettings, SerpApiClientBuilder};

/// Environment variable holding the SerpAPI key.
pub const API_KEY_ENV: &str = "SERP_API_KEY";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Flight-data provider settings.
    #[serde(default)]
    pub serpapi: SerpApiConfig,

    /// Itinerary search limits and defaults.
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SerpAPI connection settings.
#[derive(Debug, Deserialize)]
pub struct SerpApiConfig {
    /// API key. `SERP_API_KEY` takes precedence when set.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            currency: default_currency(),
            language: default_language(),
            country: default_country(),
        }
    }
}

/// Itinerary search settings.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    /// Provider calls allowed per multi-city request.
    #[serde(default = "default_max_api_calls")]
    pub max_api_calls: usize,

    /// Strategy used when a request names none.
    #[serde(default)]
    pub default_strategy: Strategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_api_calls: default_max_api_calls(),
            default_strategy: Strategy::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `itinerary=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_max_api_calls() -> usize {
    MAX_API_CALLS
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_api_calls == 0 {
            return Err(ConfigError::Invalid(
                "search.max_api_calls must be at least 1".into(),
            ));
        }
        if self.serpapi.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "serpapi.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the API key, preferring the environment over the file.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.serpapi.api_key.as_deref())
    }

    /// Client builder for the configured provider.
    pub fn client_builder(&self) -> Result<SerpApiClientBuilder, ConfigError> {
        let settings = SearchSettings {
            currency: self.serpapi.currency.clone(),
            language: self.serpapi.language.clone(),
            country: self.serpapi.country.clone(),
        };
        Ok(serpapi::SerpApiClient::builder(self.api_key()?)
            .base_url(&self.serpapi.base_url)
            .timeout(Duration::from_secs(self.serpapi.timeout_secs))
            .settings(settings))
    }

    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            max_api_calls: self.search.max_api_calls,
        }
    }
}

fn resolve_api_key(env: Option<String>, file: Option<&str>) -> Result<String, ConfigError> {
    env.into_iter()
        .chain(file.map(str::to_string))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("SerpAPI key not configured: set SERP_API_KEY or serpapi.api_key")]
    MissingApiKey,
}
