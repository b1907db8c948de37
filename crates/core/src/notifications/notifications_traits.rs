use async_trait::async_trait;

use super::notifications_model::InAppNotification;
use crate::auth::Principal;
use crate::errors::Result;

#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    async fn create(&self, notification: InAppNotification) -> Result<InAppNotification>;

    /// Newest first.
    fn list_for_user(&self, user_id: &str, unread_only: bool) -> Result<Vec<InAppNotification>>;

    /// Fails with `NotFound` unless the notification belongs to `user_id`.
    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<()>;
}

#[async_trait]
pub trait NotificationServiceTrait: Send + Sync {
    fn list_notifications(
        &self,
        principal: &Principal,
        unread_only: bool,
    ) -> Result<Vec<InAppNotification>>;

    async fn mark_read(&self, principal: &Principal, notification_id: &str) -> Result<()>;
}
