//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page retrieval settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Markup patterns used to find rooms and rows
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Paginated document settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Artifact locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or return defaults if the file doesn't exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path.as_ref());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.fetch.url)?;
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.poll_interval_ms == 0 {
            return Err(AppError::validation("fetch.poll_interval_ms must be > 0"));
        }
        if self.fetch.ready_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::validation("fetch.ready_markers has no usable marker"));
        }
        if self.extract.advisor_label.is_empty() || self.extract.grader_label.is_empty() {
            return Err(AppError::validation("extract labels must not be empty"));
        }

        for selector in [&self.extract.room_selector, &self.extract.row_selector] {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        for pattern in [
            &self.extract.room_id_pattern,
            &self.extract.time_range_pattern,
            &self.extract.presenter_trailer_pattern,
            &self.extract.room_heading_pattern,
        ] {
            Regex::new(pattern)?;
        }
        if !self.extract.room_heading_pattern.contains("(?P<room>") {
            return Err(AppError::validation(
                "extract.room_heading_pattern needs a named group 'room'",
            ));
        }
        if !self.render.heading_template.contains("{room}") {
            log::warn!("render.heading_template has no {{room}} placeholder");
        }
        Ok(())
    }
}

/// Page retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Schedule page URL
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header / browser identity
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Upper bound on the wait for real content
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between readiness checks in milliseconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// Any of these strings in the markup means the schedule has loaded
    #[serde(default = "defaults::ready_markers")]
    pub ready_markers: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            poll_interval_ms: defaults::poll_interval(),
            ready_markers: defaults::ready_markers(),
        }
    }
}

/// Markup patterns for the schedule extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Candidate room containers
    #[serde(default = "defaults::room_selector")]
    pub room_selector: String,

    /// A container is a room if its id matches this
    #[serde(default = "defaults::room_id_pattern")]
    pub room_id_pattern: String,

    /// Time-slot rows within a room container
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// Label that starts the advisor line
    #[serde(default = "defaults::advisor_label")]
    pub advisor_label: String,

    /// Label that starts the grader line
    #[serde(default = "defaults::grader_label")]
    pub grader_label: String,

    /// Time range anywhere in a row
    #[serde(default = "defaults::time_range_pattern")]
    pub time_range_pattern: String,

    /// Trailing text removed from presenter names
    #[serde(default = "defaults::presenter_trailer_pattern")]
    pub presenter_trailer_pattern: String,

    /// Room heading line for the text fallback; must capture `room`
    #[serde(default = "defaults::room_heading_pattern")]
    pub room_heading_pattern: String,

    /// Lines ignored when looking for a presenter
    #[serde(default = "defaults::skip_lines")]
    pub skip_lines: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            room_selector: defaults::room_selector(),
            room_id_pattern: defaults::room_id_pattern(),
            row_selector: defaults::row_selector(),
            advisor_label: defaults::advisor_label(),
            grader_label: defaults::grader_label(),
            time_range_pattern: defaults::time_range_pattern(),
            presenter_trailer_pattern: defaults::presenter_trailer_pattern(),
            room_heading_pattern: defaults::room_heading_pattern(),
            skip_lines: defaults::skip_lines(),
        }
    }
}

/// Paginated document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Document title
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Room heading; `{room}` is replaced with the room id
    #[serde(default = "defaults::heading_template")]
    pub heading_template: String,

    /// Add a "Time | Presenter" header row to each table
    #[serde(default)]
    pub show_headers: bool,

    /// Let a room's block split across pages
    #[serde(default)]
    pub allow_breaks: bool,

    /// Print the title before the rooms
    #[serde(default = "defaults::enabled")]
    pub include_title: bool,

    /// Print a QR deep link next to each room heading
    #[serde(default)]
    pub include_qr: bool,
}

impl RenderConfig {
    /// Heading text for a room.
    pub fn heading(&self, room_id: &str) -> String {
        self.heading_template.replace("{room}", room_id)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            heading_template: defaults::heading_template(),
            show_headers: false,
            allow_breaks: false,
            include_title: true,
            include_qr: false,
        }
    }
}

/// Artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::document_path")]
    pub document_path: PathBuf,

    #[serde(default = "defaults::export_path")]
    pub export_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            document_path: defaults::document_path(),
            export_path: defaults::export_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Fetch defaults
    pub fn url() -> String {
        "https://symposium.orfe.princeton.edu".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn poll_interval() -> u64 {
        1000
    }
    pub fn ready_markers() -> Vec<String> {
        vec!["ORFE Advisors:".into(), "PhD Candidate Graders:".into()]
    }

    // Extract defaults
    pub fn room_selector() -> String {
        "[id]".into()
    }
    pub fn room_id_pattern() -> String {
        r"^\d{3}[A-Za-z]?$".into()
    }
    pub fn row_selector() -> String {
        "tr, li".into()
    }
    pub fn advisor_label() -> String {
        "ORFE Advisors:".into()
    }
    pub fn grader_label() -> String {
        "PhD Candidate Graders:".into()
    }
    pub fn time_range_pattern() -> String {
        r"(?i)\b\d{1,2}:\d{2}\s*[ap]\.?m\.?\s*[–—-]\s*\d{1,2}:\d{2}\s*[ap]\.?m\.?".into()
    }
    pub fn presenter_trailer_pattern() -> String {
        r"\s+Link\b.*$".into()
    }
    pub fn room_heading_pattern() -> String {
        r"^(?P<room>\d{3}[A-Za-z]?)\s+-\s+\S".into()
    }
    pub fn skip_lines() -> Vec<String> {
        vec!["Link downloads document".into()]
    }

    // Render defaults
    pub fn title() -> String {
        "Class of 2026 ORFE Thesis Symposium Schedule".into()
    }
    pub fn heading_template() -> String {
        "Room {room} - Sherrerd Hall".into()
    }
    pub fn enabled() -> bool {
        true
    }

    // Output defaults
    pub fn document_path() -> PathBuf {
        PathBuf::from("symposium_schedule.pdf")
    }
    pub fn export_path() -> PathBuf {
        PathBuf::from("symposium_schedule.json")
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
