//! Data-source providers for the text blob.
//!
//! Produce writes the blob once, Count reads it once. The turn relay
//! guarantees the two never overlap, so stores need no ordering of their own.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;

/// Storage for the single text artifact exchanged between stages.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Replace the stored blob with `text`.
    async fn write_blob(&self, text: &str) -> Result<(), StoreError>;

    /// Read back the blob written last.
    async fn read_blob(&self) -> Result<String, StoreError>;

    /// Human-readable name of the artifact, used in progress messages.
    fn artifact_name(&self) -> String;
}

/// Blob stored in a text file, deleted and recreated on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub const DEFAULT_FILE_NAME: &'static str = "data.txt";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `data.txt` next to the running executable, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::DEFAULT_FILE_NAME)
    }
}

#[async_trait]
impl DataSource for FileStore {
    async fn write_blob(&self, text: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed stale artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::Remove {
                    path: self.path.clone(),
                    source,
                });
            }
        }

        tokio::fs::write(&self.path, text)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), bytes = text.len(), "Wrote blob");
        Ok(())
    }

    async fn read_blob(&self) -> Result<String, StoreError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), bytes = text.len(), "Read blob");
        Ok(text)
    }

    fn artifact_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// In-process blob, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, if anything has been written.
    pub fn contents(&self) -> Option<String> {
        self.blob
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DataSource for MemoryStore {
    async fn write_blob(&self, text: &str) -> Result<(), StoreError> {
        let mut blob = self
            .blob
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *blob = Some(text.to_owned());
        Ok(())
    }

    async fn read_blob(&self) -> Result<String, StoreError> {
        self.contents().ok_or(StoreError::Missing)
    }

    fn artifact_name(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_overwrites_previous_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data.txt"));

        store.write_blob("first run with more words").await.unwrap();
        store.write_blob("second").await.unwrap();

        assert_eq!(store.read_blob().await.unwrap(), "second");
        assert_eq!(store.artifact_name(), "data.txt");
    }

    #[tokio::test]
    async fn file_store_read_of_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.txt"));

        let err = store.read_blob().await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[tokio::test]
    async fn file_store_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("no-such-dir").join("data.txt"));

        let err = store.write_blob("ab").await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(err.to_string().contains("no-such-dir"));
    }

    #[test]
    fn default_path_ends_in_data_txt() {
        assert!(FileStore::default_path().ends_with("data.txt"));
    }

    #[tokio::test]
    async fn memory_store_requires_a_write_first() {
        let store = MemoryStore::new();
        assert!(matches!(store.read_blob().await, Err(StoreError::Missing)));

        store.write_blob("ab cd").await.unwrap();
        assert_eq!(store.read_blob().await.unwrap(), "ab cd");
        assert_eq!(store.contents().as_deref(), Some("ab cd"));
    }
}
