//! Image file storage
//!
//! Write-only store for coin images. Files are read back through static file
//! serving, addressed by the `<id>-front.jpg` / `<id>-back.jpg` convention.

use coinlens_common::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image store rooted at a single directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if missing
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Write `bytes` to `filename` under the root
    ///
    /// Creates the root on first use. An existing file with the same name is
    /// overwritten.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(filename);
        tokio::fs::write(&path, bytes).await?;
        debug!("File saved to storage: {}", path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinlens_common::Error;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_creates_root() {
        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path().join("uploads"));

        let path = store.save("abc-front.jpg", b"front-bytes").await.unwrap();

        assert_eq!(path, dir.path().join("uploads").join("abc-front.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"front-bytes");
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());

        store.save("abc-back.jpg", b"first").await.unwrap();
        let path = store.save("abc-back.jpg", b"second").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_save_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = ImageStore::new(&blocker);
        let result = store.save("abc-front.jpg", b"bytes").await;

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_ensure_root() {
        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path().join("a").join("b"));

        store.ensure_root().unwrap();
        store.ensure_root().unwrap();

        assert!(store.root().is_dir());
    }
}
