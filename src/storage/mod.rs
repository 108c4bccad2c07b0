//! Storage abstractions for output artifacts.
//!
//! Artifacts are addressed by a path relative to the storage root; an
//! absolute path is used as is.

pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for artifact storage backends.
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Write `bytes` to `key`, replacing any previous artifact.
    ///
    /// Returns the resolved location of the artifact.
    async fn write_artifact(&self, key: &Path, bytes: &[u8]) -> Result<PathBuf>;

    /// Read an artifact, returning `None` if it doesn't exist.
    async fn read_artifact(&self, key: &Path) -> Result<Option<Vec<u8>>>;
}
