use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use vaultfolio_core::errors::{Error, Result};
use vaultfolio_core::users::{NewUser, Role, User, UserRepositoryTrait};

use super::model::UserDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::users;

/// Repository for users. Balances are only ever changed by the ledger store.
pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let now = Utc::now().naive_utc();
                let user = User {
                    id: new_user
                        .id
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    email: new_user.email.trim().to_string(),
                    name: new_user.name.trim().to_string(),
                    phone: new_user.phone,
                    balance: Decimal::ZERO,
                    role: new_user.role,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(users::table)
                    .values(UserDB::from(&user))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(user)
            })
            .await
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::not_found("User", user_id))?;
        Ok(User::try_from(row)?)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::email.eq(email.trim()))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(User::try_from).transpose()?)
    }

    fn list(&self, role: Option<Role>) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = users::table.select(UserDB::as_select()).into_boxed();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_db_str()));
        }
        let rows = query
            .order(users::created_at.asc())
            .load::<UserDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(User::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
