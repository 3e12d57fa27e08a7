//! Remote-table trait
//!
//! Defines the persistence surface the remote-backed store talks to. The
//! concrete transport lives elsewhere; everything here is table-shaped
//! reads and writes over raw rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::task::{CommentRecord, NewComment, NewTask, TaskPatch, TaskRecord};
use crate::Result;

/// Table-like read/write operations for tasks and comments
///
/// Failures are uniform: implementations collapse transport, validation and
/// not-found conditions into [`crate::Error::Backend`].
#[async_trait]
pub trait TaskTables: Send + Sync {
    /// List all task rows, newest created first
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>>;

    /// List all comment rows, oldest first within a task
    async fn list_comments(&self) -> Result<Vec<CommentRecord>>;

    /// Insert a task row with `completed` false; returns the stored row
    async fn insert_task(&self, new: &NewTask) -> Result<TaskRecord>;

    /// Persist the given fields for the task with that id
    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<()>;

    /// Remove the persisted task with that id
    async fn delete_task(&self, id: Uuid) -> Result<()>;

    /// Insert a comment row attached to a task; returns the stored row
    async fn insert_comment(&self, new: &NewComment) -> Result<CommentRecord>;
}
