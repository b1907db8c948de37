//! Notification queue worker.
//!
//! Drains the notification channel one intent at a time and performs every
//! delivery it plans. Nothing here reports back to the request that emitted
//! the notification.

use std::sync::Arc;

use tokio::sync::mpsc;
use vaultfolio_core::notifications::{DeliveryChannel, Notification, NotificationRepositoryTrait};
use vaultfolio_core::users::UserRepositoryTrait;

use super::channel::{NotificationChannel, OutboundMessage};
use super::planner::{plan_deliveries, Delivery};

/// Dependencies needed by the queue worker.
pub struct QueueWorkerDeps {
    pub notification_repository: Arc<dyn NotificationRepositoryTrait>,
    pub user_repository: Arc<dyn UserRepositoryTrait>,
    pub channel: Arc<dyn NotificationChannel>,
}

/// Runs until every sender is dropped.
pub async fn notification_queue_worker(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    deps: Arc<QueueWorkerDeps>,
) {
    tracing::info!("Notification queue worker started");
    while let Some(notification) = rx.recv().await {
        deliver(&notification, &deps).await;
    }
    tracing::info!("Notification queue worker shutting down");
}

async fn deliver(notification: &Notification, deps: &QueueWorkerDeps) {
    let kind = notification.kind.as_db_str();
    for delivery in plan_deliveries(notification) {
        match delivery {
            Delivery::InApp(stored) => {
                if let Err(e) = deps.notification_repository.create(stored).await {
                    tracing::error!("Failed to store {} notification: {}", kind, e);
                }
            }
            Delivery::ToUser {
                user_id,
                channel,
                subject,
                body,
            } => {
                let Some(address) = resolve_address(deps, &user_id, channel) else {
                    continue;
                };
                send(
                    deps,
                    kind,
                    OutboundMessage {
                        channel,
                        address,
                        subject,
                        body,
                    },
                )
                .await;
            }
            Delivery::Direct(message) => send(deps, kind, message).await,
        }
    }
}

fn resolve_address(deps: &QueueWorkerDeps, user_id: &str, channel: DeliveryChannel) -> Option<String> {
    let user = match deps.user_repository.get_by_id(user_id) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Cannot notify user {}: {}", user_id, e);
            return None;
        }
    };
    match channel {
        DeliveryChannel::Email => Some(user.email),
        DeliveryChannel::WhatsApp => {
            if user.phone.is_none() {
                tracing::debug!("User {} has no phone number, skipping WhatsApp", user_id);
            }
            user.phone
        }
        DeliveryChannel::InApp => None,
    }
}

async fn send(deps: &QueueWorkerDeps, kind: &str, message: OutboundMessage) {
    if let Err(e) = deps.channel.send(&message).await {
        tracing::warn!(
            "Failed to send {} notification via {:?}: {}",
            kind,
            message.channel,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use vaultfolio_core::errors::{Error, Result};
    use vaultfolio_core::notifications::{InAppNotification, NotificationKind};
    use vaultfolio_core::users::{NewUser, User};
    use vaultfolio_core::Role;

    #[derive(Default)]
    struct MemoryNotifications {
        stored: Mutex<Vec<InAppNotification>>,
    }

    #[async_trait]
    impl NotificationRepositoryTrait for MemoryNotifications {
        async fn create(&self, notification: InAppNotification) -> Result<InAppNotification> {
            self.stored.lock().unwrap().push(notification.clone());
            Ok(notification)
        }

        fn list_for_user(&self, user_id: &str, _unread_only: bool) -> Result<Vec<InAppNotification>> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn mark_read(&self, _user_id: &str, _notification_id: &str) -> Result<()> {
            Ok(())
        }
    }

    struct OneUser(User);

    #[async_trait]
    impl UserRepositoryTrait for OneUser {
        async fn create(&self, _new_user: NewUser) -> Result<User> {
            unimplemented!()
        }

        fn get_by_id(&self, user_id: &str) -> Result<User> {
            if user_id == self.0.id {
                Ok(self.0.clone())
            } else {
                Err(Error::not_found("User", user_id))
            }
        }

        fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
            Ok(None)
        }

        fn list(&self, _role: Option<Role>) -> Result<Vec<User>> {
            Ok(vec![self.0.clone()])
        }
    }

    /// Records sends and fails every WhatsApp message.
    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
            if message.channel == DeliveryChannel::WhatsApp {
                anyhow::bail!("gateway unavailable");
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn alice() -> User {
        let now = Utc::now().naive_utc();
        User {
            id: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            phone: Some("+2348000000000".to_string()),
            balance: Decimal::ZERO,
            role: Role::User,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_worker_delivers_and_survives_channel_failures() {
        let notifications = Arc::new(MemoryNotifications::default());
        let channel = Arc::new(RecordingChannel::default());
        let deps = Arc::new(QueueWorkerDeps {
            notification_repository: notifications.clone(),
            user_repository: Arc::new(OneUser(alice())),
            channel: channel.clone(),
        });

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Notification::to_user(
            "alice",
            NotificationKind::InvestmentApproved,
            "Investment approved",
            "Your investment of 1000.00 is now active",
            Some("inv-1"),
        ))
        .unwrap();
        tx.send(Notification::to_user(
            "ghost",
            NotificationKind::InvestmentApproved,
            "Investment approved",
            "unknown user",
            None,
        ))
        .unwrap();
        tx.send(Notification::to_admin(
            "ops@example.com",
            NotificationKind::ClosureRequested,
            "Closure requested",
            "alice wants out",
            Some("inv-1"),
        ))
        .unwrap();
        drop(tx);

        notification_queue_worker(rx, deps).await;

        let stored = notifications.list_for_user("alice", false).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].reference_id.as_deref(), Some("inv-1"));

        let addresses: Vec<_> = channel
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.address.clone())
            .collect();
        assert_eq!(addresses, vec!["alice@example.com", "ops@example.com"]);
    }
}
