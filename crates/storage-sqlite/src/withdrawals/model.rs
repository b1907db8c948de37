//! Database model for withdrawals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::withdrawals::{BankDetails, Withdrawal, WithdrawalStatus};

use crate::errors::StorageError;
use crate::utils::{parse_db_enum, parse_decimal};

/// Database model for withdrawals. Bank details are stored as a JSON object.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::withdrawals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct WithdrawalDB {
    pub id: String,
    pub user_id: String,
    pub amount: String,
    pub bank_details: String,
    pub status: String,
    pub transaction_id: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<NaiveDateTime>,
    pub admin_notes: Option<String>,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<WithdrawalDB> for Withdrawal {
    type Error = StorageError;

    fn try_from(db: WithdrawalDB) -> Result<Self, Self::Error> {
        let bank_details: BankDetails = serde_json::from_str(&db.bank_details)?;
        Ok(Self {
            amount: parse_decimal(&db.amount, "withdrawals.amount")?,
            status: parse_db_enum(&db.status, "withdrawal status", WithdrawalStatus::from_db_str)?,
            bank_details,
            id: db.id,
            user_id: db.user_id,
            transaction_id: db.transaction_id,
            processed_by: db.processed_by,
            processed_at: db.processed_at,
            admin_notes: db.admin_notes,
            version: db.version,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<&Withdrawal> for WithdrawalDB {
    type Error = StorageError;

    fn try_from(wd: &Withdrawal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: wd.id.clone(),
            user_id: wd.user_id.clone(),
            amount: wd.amount.to_string(),
            bank_details: serde_json::to_string(&wd.bank_details)?,
            status: wd.status.as_db_str().to_string(),
            transaction_id: wd.transaction_id.clone(),
            processed_by: wd.processed_by.clone(),
            processed_at: wd.processed_at,
            admin_notes: wd.admin_notes.clone(),
            version: wd.version,
            created_at: wd.created_at,
            updated_at: wd.updated_at,
        })
    }
}
