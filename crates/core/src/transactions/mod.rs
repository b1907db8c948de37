//! Transactions module - audit records of cash movements.

mod transactions_model;
mod transactions_service;
mod transactions_traits;

pub use transactions_model::{
    AdjustmentMeta, ClosureMeta, DepositMeta, Transaction, TransactionMetadata, TransactionStatus,
    TransactionType, WithdrawalMeta,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
