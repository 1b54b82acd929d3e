//! Snapshot cache: a single JSON file mirroring the owner's task collection
//!
//! The file is the fallback source of truth for reads. Writes go through a
//! temp file and a rename so readers in this process never observe a
//! half-written snapshot. There is no TTL and no versioning; the only
//! invalidation is an explicit `write` or `clear`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::CacheError;
use crate::types::Task;

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tasks-cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Parsed snapshot contents, or `None` when no snapshot exists.
    pub async fn read(&self) -> Result<Option<Vec<Task>>, CacheError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace the snapshot with the full ordered task sequence.
    pub async fn write(&self, tasks: &[Task]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec(&tasks)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, &json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Remove the snapshot; a missing file is not an error.
    pub async fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
