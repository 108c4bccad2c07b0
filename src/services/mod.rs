//! Service layer for the schedule scraper.
//!
//! This module contains the business logic for:
//! - Markup retrieval (`MarkupSource`, `HttpFetcher`, `FileSource`, `BrowserFetcher`)
//! - Schedule extraction (`ScheduleExtractor`)

#[cfg(feature = "browser")]
mod browser;
mod extract;
mod fetch;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use extract::ScheduleExtractor;
pub use fetch::{FileSource, HttpFetcher, MarkupSource, is_ready};
