// src/services/browser.rs

//! Headless Chrome fetcher.
//!
//! For pages whose bot challenge only clears after running JavaScript.
//! The browser process lives exactly as long as one `fetch_markup` call:
//! `Browser` kills Chrome when dropped, so every return path releases it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptionsBuilder};

use crate::error::{AppError, Result};
use crate::models::FetchConfig;
use crate::services::fetch::{MarkupSource, is_ready};

/// Fetcher driving a headless Chrome instance.
#[derive(Clone)]
pub struct BrowserFetcher {
    user_agent: String,
    timeout: Duration,
    poll_interval: Duration,
    ready_markers: Vec<String>,
}

impl BrowserFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            ready_markers: config.ready_markers.clone(),
        }
    }

    fn fetch_blocking(&self, url: &str) -> Result<String> {
        let unavailable = |e: &dyn std::fmt::Display| AppError::fetch_unavailable(url, e);

        let options = LaunchOptionsBuilder::default()
            .headless(true)
            .idle_browser_timeout(self.timeout + Duration::from_secs(30))
            .build()
            .map_err(|e| unavailable(&e))?;
        let browser = Browser::new(options).map_err(|e| unavailable(&e))?;
        let tab = browser.new_tab().map_err(|e| unavailable(&e))?;

        tab.set_user_agent(&self.user_agent, None, None)
            .map_err(|e| unavailable(&e))?;
        tab.navigate_to(url).map_err(|e| unavailable(&e))?;

        let started = Instant::now();
        loop {
            // The challenge page may still be navigating; treat read errors as not ready.
            match tab.get_content() {
                Ok(markup) if is_ready(&markup, &self.ready_markers) => {
                    log::debug!("Rendered content ready after {:?}", started.elapsed());
                    return Ok(markup);
                }
                Ok(_) => {}
                Err(e) => log::debug!("Page not readable yet: {e}"),
            }

            if started.elapsed() >= self.timeout {
                return Err(AppError::fetch_timeout(url, self.timeout.as_secs()));
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}

#[async_trait]
impl MarkupSource for BrowserFetcher {
    async fn fetch_markup(&self, url: &str) -> Result<String> {
        let fetcher = self.clone();
        let target = url.to_string();

        tokio::task::spawn_blocking(move || fetcher.fetch_blocking(&target))
            .await
            .map_err(|e| AppError::fetch_unavailable(url, e))?
    }
}
