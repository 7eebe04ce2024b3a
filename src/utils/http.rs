// src/utils/http.rs

//! HTTP fetching.
//!
//! Both upstream sources go through the [`Fetcher`] trait so tests can swap
//! the network out. Page fetches and API fetches share one async interface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::{AppError, FetchError, Result};
use crate::models::ScraperConfig;
use crate::utils::redact;

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Extra headers sent on top of the client defaults
    pub headers: Vec<(String, String)>,

    /// Overrides the client-wide timeout
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            headers: Vec::new(),
            timeout: Some(timeout),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Network retrieval used by the API gateway and the scraper.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET an HTML/XML document.
    async fn fetch_html(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<String, FetchError>;

    /// GET a JSON document.
    async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<Value, FetchError>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ScraperConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))
}

/// [`Fetcher`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<reqwest::Response, FetchError> {
        log::debug!("GET {}", redact(url));

        let mut request = self.client.get(url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: redact(url),
                status,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_html(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<String, FetchError> {
        let response = self.get(url, options).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !is_markup(&content_type) {
            return Err(FetchError::ContentType {
                url: redact(url),
                content_type,
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<Value, FetchError> {
        let response = self.get(url, options).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: redact(url),
            message: e.to_string(),
        })
    }
}

/// Content types accepted as a web page.
fn is_markup(content_type: &str) -> bool {
    content_type.contains("html") || content_type.contains("xml")
}
