//! Vaultfolio Core - Domain entities, services, and traits.
//!
//! This crate contains the investment lifecycle, balance reconciliation and
//! withdrawal workflows of Vaultfolio. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod assets;
pub mod auth;
pub mod balances;
pub mod constants;
pub mod errors;
pub mod investments;
pub mod ledger;
pub mod notifications;
pub mod reconciliation;
pub mod settings;
pub mod transactions;
pub mod users;
pub mod withdrawals;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{Principal, Role};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
