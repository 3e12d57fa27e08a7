//! Raw persisted rows and the mapping into the local model
//!
//! Records mirror the remote tables field for field. Timestamps travel as
//! RFC 3339 strings and are parsed at the serde boundary; rows missing a
//! required field fail deserialization in the transport layer instead of
//! being defaulted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Comment, Task};

/// A raw task row as the remote table stores it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub title: String,
    /// Nullable in the table; mapped to an empty string locally.
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A raw comment row, carrying the id of the task it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub task_id: Uuid,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Map a raw comment row into the local model
    pub fn from_record(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            author: record.author,
            created_at: record.created_at,
        }
    }
}

impl Task {
    /// Map a raw task row and its comment rows into the local model
    ///
    /// Comments are attached in the order supplied; ordering them is the
    /// query's job, not the mapper's.
    pub fn from_records(record: TaskRecord, comments: Vec<CommentRecord>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description.unwrap_or_default(),
            completed: record.completed,
            created_at: record.created_at,
            image: record.image,
            comments: comments.into_iter().map(Comment::from_record).collect(),
        }
    }
}
