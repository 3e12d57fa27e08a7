//! Store operation contract
//!
//! The interface both store variants expose. Operations return an explicit
//! result so callers can await and assert deterministically; each mutation
//! additionally emits a success or failure notification as a side channel.

use async_trait::async_trait;
use uuid::Uuid;

use crate::task::{Comment, NewComment, NewTask, Task, TaskPatch};
use crate::Result;

/// CRUD and comment-append operations over the task collection
///
/// Callers must treat any `Task` they hold across an `await` as stale and
/// re-read from [`tasks`](TaskOps::tasks) afterwards.
#[async_trait]
pub trait TaskOps: Send + Sync {
    /// Create a task; the new task is placed at the head of the collection
    async fn create(&self, new: NewTask) -> Result<Task>;

    /// Merge a partial field set into the task with that id
    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<()>;

    /// Remove the task with that id
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Flip the `completed` flag of the task with that id
    ///
    /// A nonexistent id is a no-op: there is nothing to toggle.
    async fn toggle_complete(&self, id: Uuid) -> Result<()>;

    /// Append a comment to the task it names
    async fn add_comment(&self, new: NewComment) -> Result<Comment>;

    /// Snapshot of the current collection, newest task first
    async fn tasks(&self) -> Vec<Task>;

    /// Snapshot of a single task by id
    async fn get(&self, id: Uuid) -> Option<Task>;
}
