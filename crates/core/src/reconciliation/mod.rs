//! Reconciliation module - mark-to-market passes triggered by price changes.

mod reconciliation_model;
mod reconciliation_service;
mod reconciliation_traits;


pub use reconciliation_model::{ReconciliationFailure, ReconciliationReport};
pub use reconciliation_service::ReconciliationService;
pub use reconciliation_traits::ReconciliationServiceTrait;
