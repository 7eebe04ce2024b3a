//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::PageSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Structured API access
    #[serde(default)]
    pub api: ApiConfig,

    /// HTML fetching and scraping behavior
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Page landmarks for the scraper
    #[serde(default)]
    pub selectors: PageSelectors,

    /// Entity cache store
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override settings from the process environment.
    ///
    /// Credentials normally come from here rather than from the file.
    pub fn apply_env(&mut self) {
        if let Ok(id) = std::env::var("UNTAPPD_ID") {
            self.api.client_id = id;
        }
        if let Ok(secret) = std::env::var("UNTAPPD_TOKEN") {
            self.api.client_secret = secret;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.cache.redis_url = url;
        }

        if let Ok(timeout) = std::env::var("FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.scraper.timeout_secs = secs;
            }
        }

        if let Ok(concurrent) = std::env::var("MAX_CONCURRENT") {
            if let Ok(n) = concurrent.parse() {
                self.scraper.max_concurrent = n;
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        if self.api.search_limit == 0 {
            return Err(AppError::validation("api.search_limit must be > 0"));
        }
        if self.scraper.base_url.trim().is_empty() {
            return Err(AppError::validation("scraper.base_url is empty"));
        }
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.cache.enabled && self.cache.timeout_ms == 0 {
            return Err(AppError::validation("cache.timeout_ms must be > 0"));
        }
        if self.cache.enabled && self.cache.redis_url.trim().is_empty() {
            return Err(AppError::validation(
                "cache.redis_url is empty while cache is enabled",
            ));
        }
        Ok(())
    }

    /// Whether API credentials are configured at all.
    pub fn has_credentials(&self) -> bool {
        !self.api.client_id.is_empty() && !self.api.client_secret.is_empty()
    }
}

/// Structured API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "defaults::api_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Number of search hits hydrated into full records
    #[serde(default = "defaults::search_limit")]
    pub search_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::api_base_url(),
            client_id: String::new(),
            client_secret: String::new(),
            search_limit: defaults::search_limit(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "defaults::site_base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Sort order passed to the search page
    #[serde(default = "defaults::sort")]
    pub sort: String,

    /// Maximum concurrent detail requests when hydrating hits
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Delay between detail requests in crawl mode, in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::site_base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            sort: defaults::sort(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
        }
    }
}

/// Cache store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "defaults::cache_enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::redis_url")]
    pub redis_url: String,

    /// Upper bound on one store round trip, in milliseconds
    #[serde(default = "defaults::cache_timeout")]
    pub timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::cache_enabled(),
            redis_url: defaults::redis_url(),
            timeout_ms: defaults::cache_timeout(),
        }
    }
}

mod defaults {
    pub fn api_base_url() -> String {
        "https://api.untappd.com/v4".into()
    }
    pub fn search_limit() -> usize {
        3
    }

    pub fn site_base_url() -> String {
        "https://untappd.com".into()
    }
    pub fn user_agent() -> String {
        "BakhusBot".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn sort() -> String {
        "all".into()
    }
    pub fn max_concurrent() -> usize {
        5
    }

    pub fn cache_enabled() -> bool {
        true
    }
    pub fn redis_url() -> String {
        "redis://127.0.0.1:6379".into()
    }
    pub fn cache_timeout() -> u64 {
        250
    }
}
