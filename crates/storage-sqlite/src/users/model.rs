//! Database model for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::users::{Role, User};

use crate::errors::StorageError;
use crate::utils::{parse_db_enum, parse_decimal};

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
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub balance: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<UserDB> for User {
    type Error = StorageError;

    fn try_from(db: UserDB) -> Result<Self, Self::Error> {
        Ok(Self {
            balance: parse_decimal(&db.balance, "users.balance")?,
            role: parse_db_enum(&db.role, "role", Role::from_db_str)?,
            id: db.id,
            email: db.email,
            name: db.name,
            phone: db.phone,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<&User> for UserDB {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            balance: user.balance.to_string(),
            role: user.role.as_db_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
