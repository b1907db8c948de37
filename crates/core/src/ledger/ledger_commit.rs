//! The unit of work a ledger store applies atomically.
//!
//! Services decide *what* a write contains and which guards it carries; the
//! store decides *how* to apply it. Every guard in a commit is checked inside
//! the same storage transaction that performs the writes, and a failing guard
//! rolls back the whole commit.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::assets::Asset;
use crate::balances::BalanceChange;
use crate::errors::{Error, Result};
use crate::investments::Investment;
use crate::transactions::{Transaction, TransactionStatus};
use crate::withdrawals::Withdrawal;

/// Entities written under optimistic concurrency control.
pub trait Versioned {
    fn version(&self) -> i64;
    fn bump_version(&mut self);
}

/// Insert of a new record, or a compare-and-swap update of an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityWrite<T> {
    Insert(T),
    /// Applied only if the stored version still equals `expected_version`.
    /// `record` already carries the bumped version.
    Update { record: T, expected_version: i64 },
}

impl<T: Versioned> EntityWrite<T> {
    /// Builds a CAS update from a record read at its current version.
    pub fn update(mut record: T) -> Self {
        let expected_version = record.version();
        record.bump_version();
        EntityWrite::Update {
            record,
            expected_version,
        }
    }

    pub fn record(&self) -> &T {
        match self {
            EntityWrite::Insert(record) => record,
            EntityWrite::Update { record, .. } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            EntityWrite::Insert(record) => record,
            EntityWrite::Update { record, .. } => record,
        }
    }
}

/// Audit transaction writes carried by a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionWrite {
    Insert(Transaction),
    SetStatus {
        transaction_id: String,
        status: TransactionStatus,
    },
}

/// Asset state a commit was computed from, re-checked inside the commit.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetGuard {
    pub asset_id: String,
    /// Fails with a validation error if the asset was deactivated.
    pub require_active: bool,
    /// Fails with `ConcurrentModification` if the asset moved past this version.
    pub expected_version: Option<i64>,
}

impl AssetGuard {
    pub fn active(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            require_active: true,
            expected_version: None,
        }
    }

    pub fn unchanged(asset: &Asset) -> Self {
        Self {
            asset_id: asset.id.clone(),
            require_active: false,
            expected_version: Some(asset.version),
        }
    }

    /// Checks the guard against the stored `is_active` flag and version.
    pub fn check(&self, is_active: bool, version: i64) -> Result<()> {
        if self.require_active && !is_active {
            return Err(Error::invalid_input(format!(
                "Asset {} is not open for investment",
                self.asset_id
            )));
        }
        match self.expected_version {
            Some(expected) if expected != version => Err(Error::ConcurrentModification(format!(
                "Asset {} is at version {}, expected {}",
                self.asset_id, version, expected
            ))),
            _ => Ok(()),
        }
    }
}

/// One atomic unit of work against the shared store.
#[derive(Debug, Clone, Default)]
pub struct LedgerCommit {
    pub asset_guard: Option<AssetGuard>,
    pub asset: Option<EntityWrite<Asset>>,
    pub investment: Option<EntityWrite<Investment>>,
    pub withdrawal: Option<EntityWrite<Withdrawal>>,
    pub balance_changes: Vec<BalanceChange>,
    pub transactions: Vec<TransactionWrite>,
}

impl LedgerCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset_guard(mut self, guard: AssetGuard) -> Self {
        self.asset_guard = Some(guard);
        self
    }

    pub fn with_asset(mut self, write: EntityWrite<Asset>) -> Self {
        self.asset = Some(write);
        self
    }

    pub fn with_investment(mut self, write: EntityWrite<Investment>) -> Self {
        self.investment = Some(write);
        self
    }

    pub fn with_withdrawal(mut self, write: EntityWrite<Withdrawal>) -> Self {
        self.withdrawal = Some(write);
        self
    }

    pub fn with_balance_change(mut self, change: BalanceChange) -> Self {
        self.balance_changes.push(change);
        self
    }

    pub fn with_transaction(mut self, write: TransactionWrite) -> Self {
        self.transactions.push(write);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.asset.is_none()
            && self.investment.is_none()
            && self.withdrawal.is_none()
            && self.balance_changes.is_empty()
            && self.transactions.is_empty()
    }
}

/// What a store reports back after applying a commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReceipt {
    /// Balance of every user touched by the commit, after it was applied.
    pub balances: HashMap<String, Decimal>,
}

impl CommitReceipt {
    pub fn balance_of(&self, user_id: &str) -> Option<Decimal> {
        self.balances.get(user_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_guard_checks_active_flag_and_version() {
        assert!(AssetGuard::active("gold").check(true, 7).is_ok());
        assert!(matches!(
            AssetGuard::active("gold").check(false, 7),
            Err(Error::Validation(_))
        ));

        let guard = AssetGuard {
            asset_id: "gold".to_string(),
            require_active: false,
            expected_version: Some(3),
        };
        assert!(guard.check(false, 3).is_ok());
        assert!(matches!(
            guard.check(true, 4),
            Err(Error::ConcurrentModification(_))
        ));
    }
}
