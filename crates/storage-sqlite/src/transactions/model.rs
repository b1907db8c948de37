//! Database model for transactions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::transactions::{
    Transaction, TransactionMetadata, TransactionStatus, TransactionType,
};

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
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub transaction_type: String,
    pub status: String,
    pub amount: String,
    pub metadata: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = StorageError;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        let metadata: TransactionMetadata = serde_json::from_str(&db.metadata)?;
        let transaction_type = parse_db_enum(
            &db.transaction_type,
            "transaction type",
            TransactionType::from_db_str,
        )?;
        if metadata.transaction_type() != transaction_type {
            return Err(StorageError::SerializationError(format!(
                "transaction {} is {} but carries {:?} metadata",
                db.id,
                db.transaction_type,
                metadata.transaction_type()
            )));
        }
        Ok(Self {
            status: parse_db_enum(&db.status, "transaction status", TransactionStatus::from_db_str)?,
            amount: parse_decimal(&db.amount, "transactions.amount")?,
            transaction_type,
            metadata,
            id: db.id,
            user_id: db.user_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<&Transaction> for TransactionDB {
    type Error = StorageError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: tx.id.clone(),
            user_id: tx.user_id.clone(),
            transaction_type: tx.transaction_type.as_db_str().to_string(),
            status: tx.status.as_db_str().to_string(),
            amount: tx.amount.to_string(),
            metadata: serde_json::to_string(&tx.metadata)?,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        })
    }
}
