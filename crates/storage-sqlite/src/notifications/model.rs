//! Database model for in-app notifications.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::notifications::{InAppNotification, NotificationKind};

use crate::errors::StorageError;
use crate::utils::parse_db_enum;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationDB {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub reference_id: Option<String>,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<NotificationDB> for InAppNotification {
    type Error = StorageError;

    fn try_from(db: NotificationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: parse_db_enum(&db.kind, "notification kind", NotificationKind::from_db_str)?,
            id: db.id,
            user_id: db.user_id,
            title: db.title,
            message: db.message,
            reference_id: db.reference_id,
            is_read: db.is_read,
            created_at: db.created_at,
        })
    }
}

impl From<&InAppNotification> for NotificationDB {
    fn from(n: &InAppNotification) -> Self {
        Self {
            id: n.id.clone(),
            user_id: n.user_id.clone(),
            kind: n.kind.as_db_str().to_string(),
            title: n.title.clone(),
            message: n.message.clone(),
            reference_id: n.reference_id.clone(),
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}
