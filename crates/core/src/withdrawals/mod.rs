//! Withdrawals module - cash-out requests and their lifecycle.

mod withdrawals_model;
mod withdrawals_service;
mod withdrawals_traits;


pub use withdrawals_model::{BankDetails, NewWithdrawal, Withdrawal, WithdrawalStatus};
pub use withdrawals_service::WithdrawalService;
pub use withdrawals_traits::{WithdrawalRepositoryTrait, WithdrawalServiceTrait};
