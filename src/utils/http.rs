// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::FetchConfig;

/// Create a configured asynchronous HTTP client.
///
/// Cookies persist across requests so a challenge that hands out a
/// clearance cookie is passed on the next poll.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()
        .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))
}

/// Map a transport error onto the fetch error taxonomy.
pub fn classify_error(url: &str, error: reqwest::Error, waited_secs: u64) -> AppError {
    if error.is_timeout() {
        AppError::fetch_timeout(url, waited_secs)
    } else {
        AppError::fetch_unavailable(url, error)
    }
}
