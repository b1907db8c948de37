use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use vaultfolio_core::errors::{Error, Result};
use vaultfolio_core::withdrawals::{Withdrawal, WithdrawalRepositoryTrait, WithdrawalStatus};

use super::model::WithdrawalDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::withdrawals;
use crate::utils::parse_decimal;

/// Read side of withdrawals. Writes go through the ledger store.
pub struct WithdrawalRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl WithdrawalRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl WithdrawalRepositoryTrait for WithdrawalRepository {
    fn get_by_id(&self, withdrawal_id: &str) -> Result<Withdrawal> {
        let mut conn = get_connection(&self.pool)?;
        let row = withdrawals::table
            .find(withdrawal_id)
            .select(WithdrawalDB::as_select())
            .first::<WithdrawalDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::not_found("Withdrawal", withdrawal_id))?;
        Ok(Withdrawal::try_from(row)?)
    }

    fn list(
        &self,
        user_id: Option<&str>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = withdrawals::table
            .select(WithdrawalDB::as_select())
            .into_boxed();
        if let Some(user_id) = user_id {
            query = query.filter(withdrawals::user_id.eq(user_id));
        }
        if let Some(status) = status {
            query = query.filter(withdrawals::status.eq(status.as_db_str()));
        }
        let rows = query
            .order(withdrawals::created_at.desc())
            .load::<WithdrawalDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(Withdrawal::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn pending_total(&self, user_id: &str) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        // Amounts are TEXT, so the sum is done in Decimal rather than SQL.
        let amounts = withdrawals::table
            .filter(withdrawals::user_id.eq(user_id))
            .filter(withdrawals::status.eq(WithdrawalStatus::Pending.as_db_str()))
            .select(withdrawals::amount)
            .load::<String>(&mut conn)
            .into_core()?;
        let mut total = Decimal::ZERO;
        for amount in &amounts {
            total += parse_decimal(amount, "withdrawals.amount")?;
        }
        Ok(total)
    }
}
