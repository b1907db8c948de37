//! SQLite implementation of the atomic ledger commit.

mod store;

pub use store::LedgerStore;
