//! Transaction audit records.
//!
//! A transaction mirrors the lifecycle of the investment or withdrawal it is
//! linked to; it is a record, never the source of truth.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balances::AdjustmentMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    /// Settlement of a closed investment.
    Investment,
    AdminAdjustment,
}

impl TransactionType {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Investment => "INVESTMENT",
            TransactionType::AdminAdjustment => "ADMIN_ADJUSTMENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "DEPOSIT" => Some(TransactionType::Deposit),
            "WITHDRAWAL" => Some(TransactionType::Withdrawal),
            "INVESTMENT" => Some(TransactionType::Investment),
            "ADMIN_ADJUSTMENT" => Some(TransactionType::AdminAdjustment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl TransactionStatus {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Rejected => "REJECTED",
            TransactionStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "APPROVED" => Some(TransactionStatus::Approved),
            "REJECTED" => Some(TransactionStatus::Rejected),
            "COMPLETED" => Some(TransactionStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMeta {
    pub investment_id: String,
    pub asset_id: String,
    pub deposit_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalMeta {
    pub withdrawal_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureMeta {
    pub investment_id: String,
    pub asset_id: String,
    pub amount_invested: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percent: Decimal,
    pub approved_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentMeta {
    pub admin_id: String,
    pub mode: AdjustmentMode,
    pub requested_amount: Decimal,
    pub reason: String,
}

/// Typed metadata, one variant per transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionMetadata {
    Deposit(DepositMeta),
    Withdrawal(WithdrawalMeta),
    Closure(ClosureMeta),
    Adjustment(AdjustmentMeta),
}

impl TransactionMetadata {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionMetadata::Deposit(_) => TransactionType::Deposit,
            TransactionMetadata::Withdrawal(_) => TransactionType::Withdrawal,
            TransactionMetadata::Closure(_) => TransactionType::Investment,
            TransactionMetadata::Adjustment(_) => TransactionType::AdminAdjustment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    /// Signed for admin adjustments, positive otherwise.
    pub amount: Decimal,
    pub metadata: TransactionMetadata,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Builds a record whose type is derived from its metadata, so the two
    /// can never disagree.
    pub fn new(
        user_id: &str,
        status: TransactionStatus,
        amount: Decimal,
        metadata: TransactionMetadata,
        at: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            transaction_type: metadata.transaction_type(),
            status,
            amount,
            metadata,
            created_at: at,
            updated_at: at,
        }
    }
}
