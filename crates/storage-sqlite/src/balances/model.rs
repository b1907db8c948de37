//! Database model for balance ledger entries.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::balances::{BalanceLedgerEntry, BalanceReason};

use crate::errors::StorageError;
use crate::utils::{parse_db_enum, parse_decimal};

/// One row per applied balance change. Rows are never updated.
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
#[diesel(table_name = crate::schema::balance_ledger)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BalanceLedgerEntryDB {
    pub id: String,
    pub user_id: String,
    pub delta: String,
    pub balance_after: String,
    pub reason: String,
    pub reference_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<BalanceLedgerEntryDB> for BalanceLedgerEntry {
    type Error = StorageError;

    fn try_from(db: BalanceLedgerEntryDB) -> Result<Self, Self::Error> {
        Ok(Self {
            delta: parse_decimal(&db.delta, "balance_ledger.delta")?,
            balance_after: parse_decimal(&db.balance_after, "balance_ledger.balance_after")?,
            reason: parse_db_enum(&db.reason, "balance reason", BalanceReason::from_db_str)?,
            id: db.id,
            user_id: db.user_id,
            reference_id: db.reference_id,
            created_at: db.created_at,
        })
    }
}

impl From<&BalanceLedgerEntry> for BalanceLedgerEntryDB {
    fn from(entry: &BalanceLedgerEntry) -> Self {
        Self {
            id: entry.id.clone(),
            user_id: entry.user_id.clone(),
            delta: entry.delta.to_string(),
            balance_after: entry.balance_after.to_string(),
            reason: entry.reason.as_db_str().to_string(),
            reference_id: entry.reference_id.clone(),
            created_at: entry.created_at,
        }
    }
}
