//! Notification sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::notifications_model::Notification;

/// Receives notification intents from core services.
///
/// # Design Rules
///
/// - `notify()` must be fast and non-blocking (no network calls, no DB writes)
/// - It cannot fail; delivery problems are the sink's to log
/// - Services call it only after the state change it reports was committed
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    fn notify_batch(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            self.notify(notification);
        }
    }
}

/// Discards every notification.
#[derive(Clone, Default)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn notify(&self, _notification: Notification) {}
}

/// Mock sink for testing - collects emitted notifications.
#[derive(Clone, Default)]
pub struct MockNotificationSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.lock().unwrap().is_empty()
    }
}

impl NotificationSink for MockNotificationSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
