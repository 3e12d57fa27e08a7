//! Local persisted mirror of the task collection
//!
//! The full collection is written as JSON to a file under the data
//! directory, keyed by a fixed storage name, and reloaded at startup to
//! repopulate the in-memory state before any remote fetch completes.

use std::path::{Path, PathBuf};

use crate::task::Task;
use crate::{Error, Result};

/// Fixed storage key the collection is persisted under
pub const STORAGE_NAME: &str = "tasks-storage";

/// File-backed snapshot of the task collection
#[derive(Debug, Clone)]
pub struct TaskMirror {
    path: PathBuf,
}

impl TaskMirror {
    /// Create a mirror rooted at the given data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORAGE_NAME}.json")),
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted collection; a missing file yields an empty one
    pub async fn load(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read {STORAGE_NAME}: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Storage(format!("Failed to parse {STORAGE_NAME}: {}", e)))
    }

    /// Persist the given collection, replacing any previous snapshot
    pub async fn save(&self, tasks: &[Task]) -> Result<()> {
        let content = serde_json::to_string_pretty(tasks)
            .map_err(|e| Error::Storage(format!("Failed to serialize tasks: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {STORAGE_NAME}: {}", e)))
    }
}
