//! Balance change intents and their audit records.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Why a balance moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceReason {
    /// Mark-to-market delta from an asset price change.
    PriceReconciliation,
    /// Current value of a closed investment credited back to cash.
    ClosureSettlement,
    /// Cash paid out by an approved withdrawal.
    WithdrawalPayout,
    /// Manual admin override.
    AdminAdjustment,
}

impl BalanceReason {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            BalanceReason::PriceReconciliation => "PRICE_RECONCILIATION",
            BalanceReason::ClosureSettlement => "CLOSURE_SETTLEMENT",
            BalanceReason::WithdrawalPayout => "WITHDRAWAL_PAYOUT",
            BalanceReason::AdminAdjustment => "ADMIN_ADJUSTMENT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PRICE_RECONCILIATION" => Some(BalanceReason::PriceReconciliation),
            "CLOSURE_SETTLEMENT" => Some(BalanceReason::ClosureSettlement),
            "WITHDRAWAL_PAYOUT" => Some(BalanceReason::WithdrawalPayout),
            "ADMIN_ADJUSTMENT" => Some(BalanceReason::AdminAdjustment),
            _ => None,
        }
    }
}

/// Condition checked by the store against the balance it reads inside the
/// commit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceGuard {
    /// Apply unconditionally. Unrealized losses may take a balance below zero.
    None,
    /// Fail with `InsufficientBalance` if the result would be negative.
    NonNegative,
    /// Fail with `ConcurrentModification` unless the balance still equals this value.
    Expect(Decimal),
}

/// A signed increment of one user's balance.
///
/// Fields are private: changes can only be built through the constructors of
/// this module, which fix the guard that goes with each reason.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    user_id: String,
    delta: Decimal,
    guard: BalanceGuard,
    reason: BalanceReason,
    reference_id: Option<String>,
}

impl BalanceChange {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn delta(&self) -> Decimal {
        self.delta
    }

    pub fn guard(&self) -> BalanceGuard {
        self.guard
    }

    pub fn reason(&self) -> BalanceReason {
        self.reason
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.reference_id.as_deref()
    }

    /// Checks the guard against `current` and returns the new balance.
    ///
    /// Stores call this with the balance they read inside their transaction.
    pub fn apply_to(&self, current: Decimal) -> Result<Decimal> {
        let next = current.checked_add(self.delta).ok_or_else(|| {
            Error::invalid_input(format!(
                "Balance of user {} would overflow applying {}",
                self.user_id, self.delta
            ))
        })?;
        match self.guard {
            BalanceGuard::None => Ok(next),
            BalanceGuard::NonNegative => {
                if next < Decimal::ZERO {
                    Err(Error::InsufficientBalance {
                        user_id: self.user_id.clone(),
                        available: current,
                        requested: -self.delta,
                    })
                } else {
                    Ok(next)
                }
            }
            BalanceGuard::Expect(expected) => {
                if current != expected {
                    Err(Error::ConcurrentModification(format!(
                        "balance of user {} changed from {} to {}",
                        self.user_id, expected, current
                    )))
                } else {
                    Ok(next)
                }
            }
        }
    }
}

/// Adds `amount` to a balance.
pub(crate) fn credit(
    user_id: &str,
    amount: Decimal,
    reason: BalanceReason,
    reference_id: Option<String>,
) -> Result<BalanceChange> {
    if amount < Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "Credit amount cannot be negative: {}",
            amount
        )));
    }
    Ok(BalanceChange {
        user_id: user_id.to_string(),
        delta: amount,
        guard: BalanceGuard::None,
        reason,
        reference_id,
    })
}

/// Removes `amount` from a balance, never below zero.
pub(crate) fn debit(
    user_id: &str,
    amount: Decimal,
    reason: BalanceReason,
    reference_id: Option<String>,
) -> Result<BalanceChange> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "Debit amount must be positive: {}",
            amount
        )));
    }
    Ok(BalanceChange {
        user_id: user_id.to_string(),
        delta: -amount,
        guard: BalanceGuard::NonNegative,
        reason,
        reference_id,
    })
}

/// Applies an unrealized profit/loss delta. May be negative.
pub(crate) fn mark_to_market(user_id: &str, delta: Decimal, investment_id: &str) -> BalanceChange {
    BalanceChange {
        user_id: user_id.to_string(),
        delta,
        guard: BalanceGuard::None,
        reason: BalanceReason::PriceReconciliation,
        reference_id: Some(investment_id.to_string()),
    }
}

/// Moves a balance from `expected` to `target`, failing if it moved meanwhile.
pub(crate) fn reset(
    user_id: &str,
    expected: Decimal,
    target: Decimal,
    reference_id: Option<String>,
) -> Result<BalanceChange> {
    let delta = target.checked_sub(expected).ok_or_else(|| {
        Error::invalid_input(format!(
            "Cannot move balance of user {} from {} to {}",
            user_id, expected, target
        ))
    })?;
    Ok(BalanceChange {
        user_id: user_id.to_string(),
        delta,
        guard: BalanceGuard::Expect(expected),
        reason: BalanceReason::AdminAdjustment,
        reference_id,
    })
}

/// Audit record of one applied balance change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceLedgerEntry {
    pub id: String,
    pub user_id: String,
    pub delta: Decimal,
    pub balance_after: Decimal,
    pub reason: BalanceReason,
    pub reference_id: Option<String>,
    pub created_at: NaiveDateTime,
}

/// How an admin adjustment is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentMode {
    Set,
    Increase,
    Decrease,
}

/// Admin request to override a user's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustment {
    pub mode: AdjustmentMode,
    pub amount: Decimal,
    pub reason: String,
}

impl BalanceAdjustment {
    pub fn validate(&self) -> Result<()> {
        if self.reason.trim().is_empty() {
            return Err(Error::invalid_input("An adjustment reason is required"));
        }
        match self.mode {
            AdjustmentMode::Set if self.amount < Decimal::ZERO => Err(Error::invalid_input(
                "A balance cannot be set to a negative amount",
            )),
            AdjustmentMode::Increase | AdjustmentMode::Decrease
                if self.amount <= Decimal::ZERO =>
            {
                Err(Error::invalid_input("Adjustment amount must be positive"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustmentResult {
    pub user_id: String,
    pub transaction_id: String,
    pub delta: Decimal,
    pub balance: Decimal,
}
