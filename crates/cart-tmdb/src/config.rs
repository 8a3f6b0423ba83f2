//! # TMDB Configuration
//!
//! Configuration management for the TMDB catalog.
//! The API key is loaded from environment variables.

use cart_core::CartError;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// TMDB API configuration
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// v3 API key, sent as the `api_key` query parameter
    pub api_key: String,

    /// API base URL (overridable for testing/mocking)
    pub api_base_url: String,

    /// Image CDN base URL
    pub image_base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl TmdbConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `TMDB_API_KEY`
    ///
    /// Optional:
    /// - `TMDB_BASE_URL`
    /// - `TMDB_IMAGE_BASE_URL`
    /// - `TMDB_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = env::var("TMDB_API_KEY")
            .map_err(|_| CartError::Configuration("TMDB_API_KEY not set".to_string()))?;

        if api_key.trim().is_empty() {
            return Err(CartError::Configuration(
                "TMDB_API_KEY must not be empty".to_string(),
            ));
        }

        let mut config = Self::new(api_key);
        if let Ok(url) = env::var("TMDB_BASE_URL") {
            config = config.with_api_base_url(url);
        }
        if let Ok(url) = env::var("TMDB_IMAGE_BASE_URL") {
            config = config.with_image_base_url(url);
        }
        if let Ok(secs) = env::var("TMDB_TIMEOUT_SECS") {
            config = config.with_timeout(parse_timeout(&secs)?);
        }
        Ok(config)
    }

    /// Create config with an explicit key (for testing)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set custom image CDN base URL
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse a whole number of seconds; zero is rejected
fn parse_timeout(raw: &str) -> Result<Duration, CartError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(CartError::Configuration(format!(
            "TMDB_TIMEOUT_SECS must be a positive number of seconds, got {raw:?}"
        ))),
    }
}
