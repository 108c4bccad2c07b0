//! Local filesystem storage implementation.
//!
//! Writes go to a sibling `<name>.tmp` file which is then renamed over the
//! target, so a failed run never leaves a truncated artifact behind.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::ArtifactStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key.
    fn path(&self, key: &Path) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn tmp_path(path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| AppError::config(format!("{} is not a file path", path.display())))?;
        let mut tmp = OsString::from(name);
        tmp.push(".tmp");
        Ok(path.with_file_name(tmp))
    }
}

#[async_trait]
impl ArtifactStorage for LocalStorage {
    async fn write_artifact(&self, key: &Path, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = Self::tmp_path(&path)?;
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    async fn read_artifact(&self, key: &Path) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let path = storage
            .write_artifact(Path::new("schedule.pdf"), b"%PDF-1.3")
            .await
            .unwrap();
        assert_eq!(path, tmp.path().join("schedule.pdf"));
        assert!(!tmp.path().join("schedule.pdf.tmp").exists());

        let data = storage.read_artifact(Path::new("schedule.pdf")).await.unwrap();
        assert_eq!(data, Some(b"%PDF-1.3".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = Path::new("out/schedule.json");

        storage.write_artifact(key, b"first").await.unwrap();
        storage.write_artifact(key, b"second").await.unwrap();

        let data = storage.read_artifact(key).await.unwrap();
        assert_eq!(data, Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_absolute_key_ignores_root() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new("unused-root");
        let target = tmp.path().join("abs.json");

        let path = storage.write_artifact(&target, b"{}").await.unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_artifact(Path::new("nope.json")).await.unwrap();
        assert!(data.is_none());
    }
}
