//! Remote-backed task store
//!
//! Mirrors the remote tables into a single in-memory collection. Every
//! operation performs the remote call first, then computes the new local
//! state from the call's result; a failed call leaves local state
//! untouched, so no partial application is ever visible. There is no
//! client-side locking or request coalescing: concurrent mutations on the
//! same task race, and the last successful response wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::notify::{Notification, NotificationSender};
use crate::table::TaskTables;
use crate::task::{Comment, NewComment, NewTask, Task, TaskPatch};
use crate::Result;

use super::mirror::TaskMirror;
use super::ops::TaskOps;

/// Task store backed by a remote collaborator
pub struct RemoteTaskStore {
    tables: Arc<dyn TaskTables>,
    tasks: RwLock<Vec<Task>>,
    loading: AtomicBool,
    mirror: TaskMirror,
    notify_tx: NotificationSender,
}

impl RemoteTaskStore {
    /// Create a store over the given tables and local mirror
    pub fn new(
        tables: Arc<dyn TaskTables>,
        mirror: TaskMirror,
        notify_tx: NotificationSender,
    ) -> Self {
        Self {
            tables,
            tasks: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            mirror,
            notify_tx,
        }
    }

    /// Hydrate the collection from the local mirror
    ///
    /// Called once at startup, before any remote fetch completes, so the
    /// last known collection is visible immediately.
    pub async fn init(&self) -> Result<()> {
        let cached = self.mirror.load().await?;
        info!("Hydrated {} tasks from {:?}", cached.len(), self.mirror.path());
        *self.tasks.write().await = cached;
        Ok(())
    }

    /// Whether a fetch is currently in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Fetch all tasks and comments and replace the local collection
    ///
    /// Tasks arrive newest-created-first; comments are joined to their
    /// tasks in the order the comment query returned them. On failure the
    /// collection is left as it was.
    pub async fn fetch_all(&self) -> Result<()> {
        self.loading.store(true, Ordering::SeqCst);
        let fetched = self.fetch_join().await;
        self.loading.store(false, Ordering::SeqCst);

        match fetched {
            Ok(tasks) => {
                info!("Fetched {} tasks", tasks.len());
                *self.tasks.write().await = tasks;
                self.save_mirror().await;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to fetch tasks: {}", e);
                self.notify(Notification::error("Could not load tasks", e.to_string()));
                Err(e)
            }
        }
    }

    async fn fetch_join(&self) -> Result<Vec<Task>> {
        let records = self.tables.list_tasks().await?;
        let comments = self.tables.list_comments().await?;

        let mut by_task: HashMap<Uuid, Vec<_>> = HashMap::new();
        for comment in comments {
            by_task.entry(comment.task_id).or_default().push(comment);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let comments = by_task.remove(&record.id).unwrap_or_default();
                Task::from_records(record, comments)
            })
            .collect())
    }

    fn notify(&self, notification: Notification) {
        // Nobody listening is fine.
        let _ = self.notify_tx.send(notification);
    }

    /// Write the current collection to the mirror, best effort
    async fn save_mirror(&self) {
        let tasks = self.tasks.read().await;
        if let Err(e) = self.mirror.save(&tasks).await {
            warn!("Failed to persist task mirror: {}", e);
        }
    }
}

#[async_trait]
impl TaskOps for RemoteTaskStore {
    async fn create(&self, new: NewTask) -> Result<Task> {
        match self.tables.insert_task(&new).await {
            Ok(record) => {
                let task = Task::from_records(record, Vec::new());
                self.tasks.write().await.insert(0, task.clone());
                self.save_mirror().await;
                info!("Created task {}", task.id);
                self.notify(Notification::success("Task added", task.title.clone()));
                Ok(task)
            }
            Err(e) => {
                warn!("Failed to create task: {}", e);
                self.notify(Notification::error("Could not add task", e.to_string()));
                Err(e)
            }
        }
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<()> {
        match self.tables.update_task(id, &patch).await {
            Ok(()) => {
                let mut tasks = self.tasks.write().await;
                if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                    patch.apply(task);
                }
                drop(tasks);
                self.save_mirror().await;
                info!("Updated task {}", id);
                self.notify(Notification::success("Task updated", String::new()));
                Ok(())
            }
            Err(e) => {
                warn!("Failed to update task {}: {}", id, e);
                self.notify(Notification::error("Could not update task", e.to_string()));
                Err(e)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        match self.tables.delete_task(id).await {
            Ok(()) => {
                self.tasks.write().await.retain(|t| t.id != id);
                self.save_mirror().await;
                info!("Deleted task {}", id);
                self.notify(Notification::success("Task deleted", String::new()));
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete task {}: {}", id, e);
                self.notify(Notification::error("Could not delete task", e.to_string()));
                Err(e)
            }
        }
    }

    async fn toggle_complete(&self, id: Uuid) -> Result<()> {
        let current = {
            let tasks = self.tasks.read().await;
            tasks.iter().find(|t| t.id == id).map(|t| t.completed)
        };
        // Nothing to toggle.
        let Some(current) = current else {
            return Ok(());
        };

        let patch = TaskPatch::completed(!current);
        match self.tables.update_task(id, &patch).await {
            Ok(()) => {
                let mut tasks = self.tasks.write().await;
                if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                    task.completed = !current;
                }
                drop(tasks);
                self.save_mirror().await;
                let title = if current { "Task reopened" } else { "Task completed" };
                self.notify(Notification::success(title, String::new()));
                Ok(())
            }
            Err(e) => {
                warn!("Failed to toggle task {}: {}", id, e);
                self.notify(Notification::error("Could not update task", e.to_string()));
                Err(e)
            }
        }
    }

    async fn add_comment(&self, new: NewComment) -> Result<Comment> {
        let task_id = new.task_id;
        match self.tables.insert_comment(&new).await {
            Ok(record) => {
                let comment = Comment::from_record(record);
                let mut tasks = self.tasks.write().await;
                if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
                    task.comments.push(comment.clone());
                }
                drop(tasks);
                self.save_mirror().await;
                info!("Added comment to task {}", task_id);
                self.notify(Notification::success("Comment added", String::new()));
                Ok(comment)
            }
            Err(e) => {
                warn!("Failed to add comment to task {}: {}", task_id, e);
                self.notify(Notification::error("Could not add comment", e.to_string()));
                Err(e)
            }
        }
    }

    async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    async fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| t.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{self, NotificationKind, NotificationReceiver};
    use crate::task::{CommentRecord, TaskRecord};
    use crate::Error;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory stand-in for the remote tables, with a failure switch
    #[derive(Default)]
    struct FakeTables {
        tasks: Mutex<Vec<TaskRecord>>,
        comments: Mutex<Vec<CommentRecord>>,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeTables {
        fn fail_next(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.swap(false, Ordering::SeqCst) {
                Err(Error::Backend("remote unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TaskTables for FakeTables {
        async fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
            self.check()?;
            Ok(self.tasks.lock().unwrap().clone())
        }

        async fn list_comments(&self) -> Result<Vec<CommentRecord>> {
            self.check()?;
            Ok(self.comments.lock().unwrap().clone())
        }

        async fn insert_task(&self, new: &NewTask) -> Result<TaskRecord> {
            self.check()?;
            let record = TaskRecord {
                id: Uuid::new_v4(),
                title: new.title.clone(),
                description: Some(new.description.clone()),
                completed: false,
                created_at: Utc::now(),
                image: new.image.clone(),
            };
            self.tasks.lock().unwrap().insert(0, record.clone());
            Ok(record)
        }

        async fn update_task(&self, _id: Uuid, _patch: &TaskPatch) -> Result<()> {
            self.check()
        }

        async fn delete_task(&self, id: Uuid) -> Result<()> {
            self.check()?;
            self.tasks.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }

        async fn insert_comment(&self, new: &NewComment) -> Result<CommentRecord> {
            self.check()?;
            let record = CommentRecord {
                id: Uuid::new_v4(),
                task_id: new.task_id,
                text: new.text.clone(),
                author: new.author.clone(),
                created_at: Utc::now(),
            };
            self.comments.lock().unwrap().push(record.clone());
            Ok(record)
        }
    }

    struct Fixture {
        store: RemoteTaskStore,
        tables: Arc<FakeTables>,
        notifications: NotificationReceiver,
        _temp: TempDir,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let tables = Arc::new(FakeTables::default());
        let (tx, rx) = notify::channel();
        let store = RemoteTaskStore::new(
            tables.clone(),
            TaskMirror::new(temp.path()),
            tx,
        );
        Fixture {
            store,
            tables,
            notifications: rx,
            _temp: temp,
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            image: None,
        }
    }

    fn new_comment(task_id: Uuid, text: &str, author: &str) -> NewComment {
        NewComment {
            task_id,
            text: text.to_string(),
            author: author.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_prepends_task() {
        let mut fx = fixture();

        fx.store.create(new_task("First")).await.unwrap();
        let created = fx.store.create(new_task("Second")).await.unwrap();

        let tasks = fx.store.tasks().await;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, created.id);
        assert_eq!(tasks[0].title, "Second");
        assert!(!tasks[0].completed);
        assert!(tasks[0].comments.is_empty());

        let note = fx.notifications.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.title, "Task added");
    }

    #[tokio::test]
    async fn test_create_scenario_trailing_whitespace_description() {
        let fx = fixture();

        let new = NewTask {
            title: "Buy milk".to_string(),
            description: "2%  ".to_string(),
            image: None,
        };
        fx.store.create(new).await.unwrap();

        let tasks = fx.store.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].description, "2%  ");
        assert!(!tasks[0].completed);
        assert!(tasks[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_leaves_collection_unchanged() {
        let mut fx = fixture();
        fx.store.create(new_task("Existing")).await.unwrap();
        let before = fx.store.tasks().await;

        fx.tables.fail_next();
        let result = fx.store.create(new_task("Doomed")).await;

        assert!(result.is_err());
        assert_eq!(fx.store.tasks().await, before);

        // First notification is the earlier success.
        fx.notifications.try_recv().unwrap();
        let note = fx.notifications.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_original() {
        let fx = fixture();
        let task = fx.store.create(new_task("Toggle me")).await.unwrap();

        fx.store.toggle_complete(task.id).await.unwrap();
        assert!(fx.store.get(task.id).await.unwrap().completed);

        fx.store.toggle_complete(task.id).await.unwrap();
        assert!(!fx.store.get(task.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_issues_no_remote_call() {
        let fx = fixture();
        let calls_before = fx.tables.calls();

        fx.store.toggle_complete(Uuid::new_v4()).await.unwrap();

        assert_eq!(fx.tables.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_toggle_failure_keeps_flag_and_notifies() {
        let mut fx = fixture();
        let task = fx.store.create(new_task("Stays open")).await.unwrap();
        fx.notifications.try_recv().unwrap();

        fx.tables.fail_next();
        let result = fx.store.toggle_complete(task.id).await;

        assert!(result.is_err());
        assert!(!fx.store.get(task.id).await.unwrap().completed);
        let note = fx.notifications.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_update_merges_only_given_fields() {
        let fx = fixture();
        let task = fx
            .store
            .create(NewTask {
                title: "Original".to_string(),
                description: "keep".to_string(),
                image: Some("https://example.com/a.png".to_string()),
            })
            .await
            .unwrap();

        fx.store
            .update(task.id, TaskPatch::title("Renamed"))
            .await
            .unwrap();

        let updated = fx.store.get(task.id).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "keep");
        assert_eq!(updated.image.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_collection_unchanged() {
        let fx = fixture();
        let task = fx.store.create(new_task("Unchanged")).await.unwrap();
        let before = fx.store.tasks().await;

        fx.tables.fail_next();
        let result = fx.store.update(task.id, TaskPatch::title("Nope")).await;

        assert!(result.is_err());
        assert_eq!(fx.store.tasks().await, before);
    }

    #[tokio::test]
    async fn test_update_unknown_id_still_calls_remote() {
        let fx = fixture();
        let calls_before = fx.tables.calls();

        fx.store
            .update(Uuid::new_v4(), TaskPatch::title("Ghost"))
            .await
            .unwrap();

        assert_eq!(fx.tables.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_task() {
        let fx = fixture();
        let keep = fx.store.create(new_task("Keep")).await.unwrap();
        let gone = fx.store.create(new_task("Gone")).await.unwrap();

        fx.store.delete(gone.id).await.unwrap();

        let tasks = fx.store.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_collection_unchanged() {
        let mut fx = fixture();
        let task = fx.store.create(new_task("Still here")).await.unwrap();
        let before = fx.store.tasks().await;
        fx.notifications.try_recv().unwrap();

        fx.tables.fail_next();
        let result = fx.store.delete(task.id).await;

        assert!(result.is_err());
        assert_eq!(fx.store.tasks().await, before);
        let note = fx.notifications.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_add_comment_appends_in_order() {
        let fx = fixture();
        let task = fx.store.create(new_task("Discussed")).await.unwrap();

        fx.store
            .add_comment(new_comment(task.id, "first", "Alice"))
            .await
            .unwrap();
        fx.store
            .add_comment(new_comment(task.id, "second", "Bob"))
            .await
            .unwrap();

        let comments = fx.store.get(task.id).await.unwrap().comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "first");
        assert_eq!(comments[0].author, "Alice");
        assert_eq!(comments[1].text, "second");
    }

    #[tokio::test]
    async fn test_add_comment_failure_leaves_collection_unchanged() {
        let fx = fixture();
        let task = fx.store.create(new_task("Quiet")).await.unwrap();
        let before = fx.store.tasks().await;

        fx.tables.fail_next();
        let result = fx
            .store
            .add_comment(new_comment(task.id, "lost", "Alice"))
            .await;

        assert!(result.is_err());
        assert_eq!(fx.store.tasks().await, before);
    }

    #[tokio::test]
    async fn test_fetch_all_joins_comments_to_tasks() {
        let fx = fixture();

        let task_a = TaskRecord {
            id: Uuid::new_v4(),
            title: "A".to_string(),
            description: None,
            completed: false,
            created_at: Utc::now(),
            image: None,
        };
        let task_b = TaskRecord {
            id: Uuid::new_v4(),
            title: "B".to_string(),
            description: Some("b".to_string()),
            completed: true,
            created_at: Utc::now(),
            image: None,
        };
        let comment = |task_id, text: &str| CommentRecord {
            id: Uuid::new_v4(),
            task_id,
            text: text.to_string(),
            author: "Alice".to_string(),
            created_at: Utc::now(),
        };

        *fx.tables.tasks.lock().unwrap() = vec![task_a.clone(), task_b.clone()];
        *fx.tables.comments.lock().unwrap() = vec![
            comment(task_a.id, "a-one"),
            comment(task_b.id, "b-one"),
            comment(task_a.id, "a-two"),
        ];

        fx.store.fetch_all().await.unwrap();

        let a = fx.store.get(task_a.id).await.unwrap();
        let texts: Vec<&str> = a.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a-one", "a-two"]);
        assert_eq!(a.description, "");

        let b = fx.store.get(task_b.id).await.unwrap();
        assert_eq!(b.comments.len(), 1);
        assert_eq!(b.comments[0].text, "b-one");
        assert!(!fx.store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_all_failure_keeps_collection_and_clears_loading() {
        let mut fx = fixture();
        fx.store.create(new_task("Cached")).await.unwrap();
        let before = fx.store.tasks().await;
        fx.notifications.try_recv().unwrap();

        fx.tables.fail_next();
        let result = fx.store.fetch_all().await;

        assert!(result.is_err());
        assert!(!fx.store.is_loading());
        assert_eq!(fx.store.tasks().await, before);
        let note = fx.notifications.try_recv().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_init_hydrates_from_mirror() {
        let temp = TempDir::new().unwrap();
        let (tx, _rx) = notify::channel();

        // First store writes the mirror through a create.
        let store = RemoteTaskStore::new(
            Arc::new(FakeTables::default()),
            TaskMirror::new(temp.path()),
            tx.clone(),
        );
        let task = store.create(new_task("Cached task")).await.unwrap();

        // Second store sees it before any fetch.
        let store2 = RemoteTaskStore::new(
            Arc::new(FakeTables::default()),
            TaskMirror::new(temp.path()),
            tx,
        );
        store2.init().await.unwrap();

        let tasks = store2.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
        assert_eq!(tasks[0].title, "Cached task");
    }
}
