use tokio::sync::mpsc;
use vaultfolio_core::notifications::{Notification, NotificationSink};

/// Sink that queues notifications for the background worker.
#[derive(Clone)]
pub struct QueuedNotificationSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl QueuedNotificationSink {
    /// Creates the sink together with the receiving end for the worker.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for QueuedNotificationSink {
    fn notify(&self, notification: Notification) {
        let kind = notification.kind;
        if self.tx.send(notification).is_err() {
            tracing::warn!(
                "Notification queue closed, dropping {} notification",
                kind.as_db_str()
            );
        }
    }
}
