//! Local-only task store
//!
//! The non-backed fallback: no remote collaborator, ids generated locally,
//! every mutation written straight into the local collection and persisted
//! to the mirror file. There is no fetch or loading concept; the collection
//! is hydrated once at construction.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::notify::{Notification, NotificationSender};
use crate::task::{Comment, NewComment, NewTask, Task, TaskPatch};
use crate::Result;

use super::mirror::TaskMirror;
use super::ops::TaskOps;

/// Task store keeping all state in local persisted storage
pub struct LocalTaskStore {
    tasks: RwLock<Vec<Task>>,
    mirror: TaskMirror,
    notify_tx: NotificationSender,
}

impl LocalTaskStore {
    /// Open the store, loading any previously persisted collection
    pub async fn new(mirror: TaskMirror, notify_tx: NotificationSender) -> Result<Self> {
        let tasks = mirror.load().await?;
        info!("Loaded {} tasks from {:?}", tasks.len(), mirror.path());
        Ok(Self {
            tasks: RwLock::new(tasks),
            mirror,
            notify_tx,
        })
    }

    fn notify(&self, notification: Notification) {
        let _ = self.notify_tx.send(notification);
    }

    async fn persist(&self) -> Result<()> {
        let tasks = self.tasks.read().await;
        self.mirror.save(&tasks).await
    }

    /// Persist and report the outcome of a mutation
    async fn finish(&self, success: Notification) -> Result<()> {
        match self.persist().await {
            Ok(()) => {
                self.notify(success);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to persist tasks: {}", e);
                self.notify(Notification::error("Could not save tasks", e.to_string()));
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TaskOps for LocalTaskStore {
    async fn create(&self, new: NewTask) -> Result<Task> {
        let mut task = Task::new(new.title).with_description(new.description);
        task.image = new.image;
        self.tasks.write().await.insert(0, task.clone());
        self.finish(Notification::success("Task added", task.title.clone()))
            .await?;
        Ok(task)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<()> {
        {
            let mut tasks = self.tasks.write().await;
            if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                patch.apply(task);
            }
        }
        self.finish(Notification::success("Task updated", String::new()))
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.tasks.write().await.retain(|t| t.id != id);
        self.finish(Notification::success("Task deleted", String::new()))
            .await
    }

    async fn toggle_complete(&self, id: Uuid) -> Result<()> {
        let toggled = {
            let mut tasks = self.tasks.write().await;
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    task.completed = !task.completed;
                    Some(task.completed)
                }
                None => None,
            }
        };
        // Nothing to toggle.
        let Some(completed) = toggled else {
            return Ok(());
        };
        let title = if completed { "Task completed" } else { "Task reopened" };
        self.finish(Notification::success(title, String::new())).await
    }

    async fn add_comment(&self, new: NewComment) -> Result<Comment> {
        let comment = Comment::new(new.text, new.author);
        {
            let mut tasks = self.tasks.write().await;
            if let Some(task) = tasks.iter_mut().find(|t| t.id == new.task_id) {
                task.comments.push(comment.clone());
            }
        }
        self.finish(Notification::success("Comment added", String::new()))
            .await?;
        Ok(comment)
    }

    async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    async fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| t.id == id).cloned()
    }
}
