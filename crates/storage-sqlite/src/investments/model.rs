//! Database model for investments.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::investments::{Investment, InvestmentState};

use crate::errors::StorageError;
use crate::utils::{parse_db_enum, parse_decimal};

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
#[diesel(table_name = crate::schema::investments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct InvestmentDB {
    pub id: String,
    pub user_id: String,
    pub asset_id: String,
    pub amount: String,
    pub quantity: String,
    pub purchase_price: String,
    pub current_value: String,
    pub profit_loss: String,
    pub deposit_method: String,
    pub deposit_proof: Option<String>,
    pub deposit_transaction_id: String,
    pub state: String,
    pub approved_at: Option<NaiveDateTime>,
    pub approved_by: Option<String>,
    pub rejected_at: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
    pub closure_requested_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
    pub closure_approved_by: Option<String>,
    pub closure_rejected_at: Option<NaiveDateTime>,
    pub closure_notes: Option<String>,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<InvestmentDB> for Investment {
    type Error = StorageError;

    fn try_from(db: InvestmentDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal(&db.amount, "investments.amount")?,
            quantity: parse_decimal(&db.quantity, "investments.quantity")?,
            purchase_price: parse_decimal(&db.purchase_price, "investments.purchase_price")?,
            current_value: parse_decimal(&db.current_value, "investments.current_value")?,
            profit_loss: parse_decimal(&db.profit_loss, "investments.profit_loss")?,
            state: parse_db_enum(&db.state, "investment state", InvestmentState::from_db_str)?,
            id: db.id,
            user_id: db.user_id,
            asset_id: db.asset_id,
            deposit_method: db.deposit_method,
            deposit_proof: db.deposit_proof,
            deposit_transaction_id: db.deposit_transaction_id,
            approved_at: db.approved_at,
            approved_by: db.approved_by,
            rejected_at: db.rejected_at,
            rejection_reason: db.rejection_reason,
            closure_requested_at: db.closure_requested_at,
            closed_at: db.closed_at,
            closure_approved_by: db.closure_approved_by,
            closure_rejected_at: db.closure_rejected_at,
            closure_notes: db.closure_notes,
            version: db.version,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<&Investment> for InvestmentDB {
    fn from(inv: &Investment) -> Self {
        Self {
            id: inv.id.clone(),
            user_id: inv.user_id.clone(),
            asset_id: inv.asset_id.clone(),
            amount: inv.amount.to_string(),
            quantity: inv.quantity.to_string(),
            purchase_price: inv.purchase_price.to_string(),
            current_value: inv.current_value.to_string(),
            profit_loss: inv.profit_loss.to_string(),
            deposit_method: inv.deposit_method.clone(),
            deposit_proof: inv.deposit_proof.clone(),
            deposit_transaction_id: inv.deposit_transaction_id.clone(),
            state: inv.state.as_db_str().to_string(),
            approved_at: inv.approved_at,
            approved_by: inv.approved_by.clone(),
            rejected_at: inv.rejected_at,
            rejection_reason: inv.rejection_reason.clone(),
            closure_requested_at: inv.closure_requested_at,
            closed_at: inv.closed_at,
            closure_approved_by: inv.closure_approved_by.clone(),
            closure_rejected_at: inv.closure_rejected_at,
            closure_notes: inv.closure_notes.clone(),
            version: inv.version,
            created_at: inv.created_at,
            updated_at: inv.updated_at,
        }
    }
}
