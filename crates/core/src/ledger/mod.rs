//! Ledger module - valuation primitives and the atomic unit of work that
//! every money-moving operation is expressed as.

mod ledger_commit;
mod ledger_math;
mod ledger_traits;

pub use ledger_commit::{
    AssetGuard, CommitReceipt, EntityWrite, LedgerCommit, TransactionWrite, Versioned,
};
pub use ledger_math::{
    current_value, profit_loss, profit_loss_percent, quantity, value_at, Valuation,
};
pub use ledger_traits::LedgerStoreTrait;

pub(crate) use ledger_traits::retry_on_conflict;
