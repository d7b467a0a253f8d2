//! File storage backend
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary
//! sibling first and are renamed over the target, so a concurrent reader
//! sees either the previous record or the new one, never a partial write.

use super::KeyValueStore;
use crate::error::StorageError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn unavailable(action: &str, path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Unavailable {
        reason: format!("Failed to {} {}: {}", action, path.display(), e),
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No record at {:?}", path);
                Ok(None)
            }
            Err(e) => Err(unavailable("read", &path, e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| unavailable("create", &self.dir, e))?;

        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|e| unavailable("write", &tmp_path, e))?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| unavailable("replace", &path, e))?;

        debug!("Wrote record to {:?}", path);
        Ok(())
    }
}
