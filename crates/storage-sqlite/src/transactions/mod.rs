//! SQLite storage implementation for audit transactions.

mod model;
mod repository;

pub use model::TransactionDB;
pub use repository::TransactionRepository;
