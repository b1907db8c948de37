//! Balances module - the only place that produces balance changes.
//!
//! Every write to a user's balance is a [`BalanceChange`] built here and
//! applied by a ledger store inside a commit. Other modules request credits
//! and debits through the constructors below; none of them touch the field.

mod balances_model;
mod balances_service;
mod balances_traits;

#[cfg(test)]
mod balances_service_tests;

pub use balances_model::{
    AdjustmentMode, BalanceAdjustment, BalanceAdjustmentResult, BalanceChange, BalanceGuard,
    BalanceLedgerEntry, BalanceReason,
};
pub(crate) use balances_model::{credit, debit, mark_to_market};
pub use balances_service::BalanceService;
pub use balances_traits::{BalanceLedgerRepositoryTrait, BalanceServiceTrait};
