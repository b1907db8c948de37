use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use vaultfolio_core::errors::{Error, Result};
use vaultfolio_core::notifications::{InAppNotification, NotificationRepositoryTrait};

use super::model::NotificationDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::notifications;

pub struct NotificationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl NotificationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn create(&self, notification: InAppNotification) -> Result<InAppNotification> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InAppNotification> {
                diesel::insert_into(notifications::table)
                    .values(NotificationDB::from(&notification))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(notification)
            })
            .await
    }

    fn list_for_user(&self, user_id: &str, unread_only: bool) -> Result<Vec<InAppNotification>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .select(NotificationDB::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::is_read.eq(false));
        }
        let rows = query
            .order(notifications::created_at.desc())
            .load::<NotificationDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(InAppNotification::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let notification_id = notification_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let updated = diesel::update(
                    notifications::table
                        .filter(notifications::id.eq(&notification_id))
                        .filter(notifications::user_id.eq(&user_id)),
                )
                .set(notifications::is_read.eq(true))
                .execute(conn)
                .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(Error::not_found("Notification", &notification_id));
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDb;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use vaultfolio_core::notifications::NotificationKind;

    fn notification(user_id: &str, title: &str, minutes_ago: i64) -> InAppNotification {
        InAppNotification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: NotificationKind::InvestmentApproved,
            title: title.to_string(),
            message: "Your investment is now active".to_string(),
            reference_id: Some("inv-1".to_string()),
            is_read: false,
            created_at: Utc::now().naive_utc() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_list_and_mark_read() {
        let db = TestDb::new();
        db.seed_user("alice", Decimal::ZERO);
        db.seed_user("bob", Decimal::ZERO);
        let repo = NotificationRepository::new(Arc::clone(&db.pool), db.writer.clone());

        let older = repo.create(notification("alice", "older", 5)).await.unwrap();
        repo.create(notification("alice", "newer", 1)).await.unwrap();
        repo.create(notification("bob", "bob's", 1)).await.unwrap();

        let titles: Vec<_> = repo
            .list_for_user("alice", false)
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);

        assert!(matches!(
            repo.mark_read("bob", &older.id).await,
            Err(Error::NotFound(_))
        ));
        repo.mark_read("alice", &older.id).await.unwrap();

        let unread = repo.list_for_user("alice", true).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "newer");
        assert_eq!(unread[0].kind, NotificationKind::InvestmentApproved);
    }
}
