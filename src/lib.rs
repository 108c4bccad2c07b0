// src/lib.rs

//! ORFE thesis symposium schedule scraper.
//!
//! Fetches the rendered schedule page, extracts per-room advisors, graders
//! and time slots, and emits a printable PDF, a JSON export or a digest.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod services;
pub mod storage;
pub mod utils;
