// src/error.rs

//! Unified error handling for the schedule scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The page never reached a ready state within the bounded wait
    #[error("Timed out after {waited_secs}s waiting for schedule content at {url}")]
    FetchTimeout { url: String, waited_secs: u64 },

    /// The page could not be retrieved at all
    #[error("Schedule page {url} is unavailable: {message}")]
    FetchUnavailable { url: String, message: String },

    /// Markup was retrieved but did not yield a usable schedule
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The output artifact could not be produced
    #[error("Render error: {0}")]
    Render(String),

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

    /// Regular expression failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch timeout error.
    pub fn fetch_timeout(url: impl Into<String>, waited_secs: u64) -> Self {
        Self::FetchTimeout {
            url: url.into(),
            waited_secs,
        }
    }

    /// Create a fetch unavailable error.
    pub fn fetch_unavailable(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::FetchUnavailable {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create a render error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
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

    /// Whether the error came from the fetch stage.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::FetchTimeout { .. } | Self::FetchUnavailable { .. })
    }
}
