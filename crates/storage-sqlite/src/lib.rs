//! SQLite storage implementation for Vaultfolio.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `vaultfolio-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - The ledger store that applies money-moving commits atomically
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! Core is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! Reads go through the r2d2 pool. Every write goes through the single
//! writer actor, one `IMMEDIATE` transaction per job.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod assets;
pub mod balances;
pub mod investments;
pub mod ledger;
pub mod notifications;
pub mod transactions;
pub mod users;
pub mod withdrawals;

#[cfg(test)]
mod test_utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use assets::AssetRepository;
pub use balances::BalanceLedgerRepository;
pub use investments::InvestmentRepository;
pub use ledger::LedgerStore;
pub use notifications::NotificationRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;
pub use withdrawals::WithdrawalRepository;

// Re-export from vaultfolio-core for convenience
pub use vaultfolio_core::errors::{DatabaseError, Error, Result};
