//! User-input drafts
//!
//! Validation of required text fields belongs to the caller, not the store:
//! a draft either trims down to a valid payload or is rejected before any
//! store call is issued.

use uuid::Uuid;

use crate::{Error, Result};

use super::model::{NewComment, NewTask};

/// Unvalidated task input as the user typed it
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Validate the draft into a create payload
    ///
    /// The title must be non-empty after trimming. The description is passed
    /// through as typed.
    pub fn validate(self) -> Result<NewTask> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("Title cannot be empty".to_string()));
        }
        Ok(NewTask {
            title: title.to_string(),
            description: self.description,
            image: self.image,
        })
    }
}

/// Unvalidated comment input as the user typed it
#[derive(Debug, Clone)]
pub struct CommentDraft {
    pub task_id: Uuid,
    pub text: String,
    pub author: String,
}

impl CommentDraft {
    pub fn new(task_id: Uuid, text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            task_id,
            text: text.into(),
            author: author.into(),
        }
    }

    /// Validate the draft into a comment payload
    ///
    /// Both text and author must be non-empty after trimming.
    pub fn validate(self) -> Result<NewComment> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Comment cannot be empty".to_string()));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(Error::InvalidInput("Author cannot be empty".to_string()));
        }
        Ok(NewComment {
            task_id: self.task_id,
            text: text.to_string(),
            author: author.to_string(),
        })
    }
}
