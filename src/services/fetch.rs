// src/services/fetch.rs

//! Markup fetcher service.
//!
//! Retrieves the rendered schedule page. A page counts as loaded once it
//! contains one of the configured ready markers; anything else (a bot
//! challenge interstitial, an empty skeleton, a 403/503 challenge response)
//! is polled again until the bounded wait runs out.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::FetchConfig;
use crate::utils::http::{classify_error, create_async_client};

/// Capability to obtain rendered page markup.
#[async_trait]
pub trait MarkupSource: Send + Sync {
    /// Fetch the markup of `url` once the schedule content is present.
    async fn fetch_markup(&self, url: &str) -> Result<String>;
}

/// Whether the markup contains real schedule content.
pub fn is_ready(markup: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .filter(|m| !m.trim().is_empty())
        .any(|m| markup.contains(m.as_str()))
}

/// Plain HTTP fetcher with readiness polling.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    poll_interval: Duration,
    ready_markers: Vec<String>,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            timeout: Duration::from_secs(config.timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            ready_markers: config.ready_markers.clone(),
        })
    }

    /// One request; `None` means the server answered but the page is not ready.
    async fn fetch_once(&self, url: &str, started: Instant) -> Result<Option<String>> {
        let waited = started.elapsed().as_secs();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e, waited))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e, waited))?;

        if !status.is_success() {
            log::debug!("{url} answered {status}, waiting for challenge to clear");
            return Ok(None);
        }
        if !is_ready(&body, &self.ready_markers) {
            log::debug!("{url} returned {} bytes without schedule content", body.len());
            return Ok(None);
        }
        Ok(Some(body))
    }
}

#[async_trait]
impl MarkupSource for HttpFetcher {
    async fn fetch_markup(&self, url: &str) -> Result<String> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut attempts = 0usize;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(AppError::fetch_timeout(url, self.timeout.as_secs()));
            }

            attempts += 1;
            match tokio::time::timeout(remaining, self.fetch_once(url, started)).await {
                Err(_) => return Err(AppError::fetch_timeout(url, self.timeout.as_secs())),
                Ok(Err(e)) => return Err(e),
                Ok(Ok(Some(body))) => {
                    log::debug!("Schedule content ready after {attempts} request(s)");
                    return Ok(body);
                }
                Ok(Ok(None)) => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

/// Reads markup from a saved HTML file instead of the network.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarkupSource for FileSource {
    async fn fetch_markup(&self, _url: &str) -> Result<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::fetch_unavailable(self.path.display().to_string(), e)
        })
    }
}
