use std::sync::Arc;

use super::transactions_model::{Transaction, TransactionType};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::auth::Principal;
use crate::errors::Result;

pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl TransactionServiceTrait for TransactionService {
    fn list_user_transactions(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<Transaction>> {
        principal.require_owner_or_admin(user_id)?;
        self.repository.list(Some(user_id), None)
    }

    fn list_transactions(
        &self,
        principal: &Principal,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        principal.require_admin()?;
        self.repository.list(None, transaction_type)
    }
}
