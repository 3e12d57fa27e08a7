//! User-facing notifications
//!
//! Every mutating store operation emits one transient notification on an
//! unbounded channel handed in at store construction. Display and
//! auto-dismissal belong to the consumer; a closed receiver is ignored.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient success or failure notice with a short title and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Create the channel a store publishes its notifications on
pub fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_constructors() {
        let ok = Notification::success("Task added", "Buy milk");
        assert_eq!(ok.kind, NotificationKind::Success);
        assert_eq!(ok.title, "Task added");

        let err = Notification::error("Update failed", "Backend error");
        assert_eq!(err.kind, NotificationKind::Error);
    }
}
