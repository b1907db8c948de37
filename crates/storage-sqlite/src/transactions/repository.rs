use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use vaultfolio_core::errors::{Error, Result};
use vaultfolio_core::transactions::{Transaction, TransactionRepositoryTrait, TransactionType};

use super::model::TransactionDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::transactions;

pub struct TransactionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        let row = transactions::table
            .find(transaction_id)
            .select(TransactionDB::as_select())
            .first::<TransactionDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))?;
        Ok(Transaction::try_from(row)?)
    }

    fn list(
        &self,
        user_id: Option<&str>,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = transactions::table
            .select(TransactionDB::as_select())
            .into_boxed();
        if let Some(user_id) = user_id {
            query = query.filter(transactions::user_id.eq(user_id));
        }
        if let Some(transaction_type) = transaction_type {
            query = query.filter(transactions::transaction_type.eq(transaction_type.as_db_str()));
        }
        let rows = query
            .order(transactions::created_at.desc())
            .load::<TransactionDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(Transaction::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
