use async_trait::async_trait;
use std::sync::Arc;

use super::notifications_model::InAppNotification;
use super::notifications_traits::{NotificationRepositoryTrait, NotificationServiceTrait};
use crate::auth::Principal;
use crate::errors::Result;

/// In-app notification inbox of the calling principal.
pub struct NotificationService {
    repository: Arc<dyn NotificationRepositoryTrait>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn NotificationRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    fn list_notifications(
        &self,
        principal: &Principal,
        unread_only: bool,
    ) -> Result<Vec<InAppNotification>> {
        self.repository
            .list_for_user(&principal.user_id, unread_only)
    }

    async fn mark_read(&self, principal: &Principal, notification_id: &str) -> Result<()> {
        self.repository
            .mark_read(&principal.user_id, notification_id)
            .await
    }
}
