//! SQLite storage implementation for the balance ledger.

mod model;
mod repository;

pub use model::BalanceLedgerEntryDB;
pub use repository::BalanceLedgerRepository;
