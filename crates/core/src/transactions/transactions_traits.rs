use crate::auth::Principal;
use crate::errors::Result;

use super::transactions_model::{Transaction, TransactionType};

/// Read access to transaction records. Writes happen inside ledger commits.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    /// Newest first.
    fn list(
        &self,
        user_id: Option<&str>,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>>;
}

pub trait TransactionServiceTrait: Send + Sync {
    fn list_user_transactions(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<Transaction>>;

    fn list_transactions(
        &self,
        principal: &Principal,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>>;
}
