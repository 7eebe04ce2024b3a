// src/error.rs

//! Unified error handling for the resolver.
//!
//! Transport faults live in their own enum so the resolver can tell
//! "the source is unreachable" apart from "the source answered with
//! something we could not use". Only the former triggers a fallback.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// A request that produced no usable response.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or protocol failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response status other than 200
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// HTML was requested but something else came back
    #[error("unexpected content type '{content_type}' for {url}")]
    ContentType { url: String, content_type: String },

    /// A 200 response whose body could not be decoded
    #[error("undecodable body from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream source unreachable or misbehaving at the HTTP level
    #[error("Transport error: {0}")]
    Transport(#[from] FetchError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Expected document landmark missing
    #[error("Parse error for {context}: {message}")]
    Parse { context: String, message: String },

    /// Entity kind tag not recognised
    #[error("Unknown entity kind '{0}', expected 'beer' or 'brewery'")]
    UnknownKind(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error should hand the request over to the fallback source.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
