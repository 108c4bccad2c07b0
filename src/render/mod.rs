//! Output renderers: PDF document, JSON export and digest.

pub mod digest;
pub mod document;
pub mod export;
pub mod layout;
pub mod pdf;
pub mod qr;

pub use digest::digest;
pub use document::{DocumentOptions, DocumentRenderer};
pub use export::{from_json, to_json};
