//! SQLite storage implementation for withdrawals.

mod model;
mod repository;

pub use model::WithdrawalDB;
pub use repository::WithdrawalRepository;
