//! Terminal rendering for tasks and notifications

use taskpad_core::notify::{Notification, NotificationKind, NotificationReceiver};
use taskpad_core::task::Task;

/// One-line summary of a task
pub fn task_line(task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{}] {}  {}  {}",
        check,
        short_id(task),
        task.created_at.format("%Y-%m-%d"),
        task.title
    );
    if !task.comments.is_empty() {
        line.push_str(&format!("  ({} comments)", task.comments.len()));
    }
    line
}

/// Full task view with description, image and comments
pub fn task_detail(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", task.title));
    out.push_str(&format!("  id:        {}\n", task.id));
    out.push_str(&format!(
        "  status:    {}\n",
        if task.completed { "completed" } else { "active" }
    ));
    out.push_str(&format!("  created:   {}\n", task.created_at.to_rfc3339()));
    if !task.description.is_empty() {
        out.push_str(&format!("  notes:     {}\n", task.description));
    }
    if let Some(image) = &task.image {
        out.push_str(&format!("  image:     {}\n", image));
    }
    if !task.comments.is_empty() {
        out.push_str("  comments:\n");
        for comment in &task.comments {
            out.push_str(&format!(
                "    {} ({}): {}\n",
                comment.author,
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.text
            ));
        }
    }
    out
}

/// First id segment, enough to eyeball a short list
fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(8).collect()
}

/// Print every notification raised so far
pub fn drain(notifications: &mut NotificationReceiver) {
    while let Ok(notification) = notifications.try_recv() {
        print(&notification);
    }
}

fn print(notification: &Notification) {
    let tag = match notification.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
    };
    if notification.description.is_empty() {
        eprintln!("[{}] {}", tag, notification.title);
    } else {
        eprintln!("[{}] {}: {}", tag, notification.title, notification.description);
    }
}
