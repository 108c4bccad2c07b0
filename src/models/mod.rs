// src/models/mod.rs

//! Domain models for the schedule scraper.
//!
//! - `schedule`: the canonical room → schedule mapping
//! - `config`: TOML-backed application configuration

mod config;
mod schedule;

// Re-export all public types
pub use config::{Config, ExtractConfig, FetchConfig, LoggingConfig, OutputConfig, RenderConfig};
pub use schedule::{RoomSchedule, Schedule, TimeSlot};
