//! User-visible, non-blocking notifications (toasts).

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

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

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Sink for notifications raised by stores.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Logs notifications through `tracing` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                tracing::info!("{}: {}", notification.title, notification.description);
            }
            NotificationKind::Error => {
                tracing::error!("{}: {}", notification.title, notification.description);
            }
        }
    }
}

/// Collects notifications so a shell can display them after an operation.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationQueue {
    /// Take every queued notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|mut items| std::mem::take(&mut *items))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        LogNotifier.notify(notification.clone());
        if let Ok(mut items) = self.items.lock() {
            items.push(notification);
        }
    }
}
