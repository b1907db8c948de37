use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use vaultfolio_core::balances::{BalanceLedgerEntry, BalanceLedgerRepositoryTrait};
use vaultfolio_core::errors::Result;

use super::model::BalanceLedgerEntryDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::balance_ledger;

pub struct BalanceLedgerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl BalanceLedgerRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl BalanceLedgerRepositoryTrait for BalanceLedgerRepository {
    fn list_by_user(&self, user_id: &str) -> Result<Vec<BalanceLedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = balance_ledger::table
            .filter(balance_ledger::user_id.eq(user_id))
            .select(BalanceLedgerEntryDB::as_select())
            .order(balance_ledger::created_at.desc())
            .load::<BalanceLedgerEntryDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(BalanceLedgerEntry::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
