use async_trait::async_trait;
use rust_decimal::Decimal;

use super::balances_model::{BalanceAdjustment, BalanceAdjustmentResult, BalanceLedgerEntry};
use crate::auth::Principal;
use crate::errors::Result;

/// Read access to balance ledger entries. Entries are written by the ledger
/// store as part of each commit.
pub trait BalanceLedgerRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list_by_user(&self, user_id: &str) -> Result<Vec<BalanceLedgerEntry>>;
}

#[async_trait]
pub trait BalanceServiceTrait: Send + Sync {
    /// Manual admin override of a user's balance.
    async fn adjust_balance(
        &self,
        principal: &Principal,
        user_id: &str,
        adjustment: BalanceAdjustment,
    ) -> Result<BalanceAdjustmentResult>;

    fn get_balance(&self, principal: &Principal, user_id: &str) -> Result<Decimal>;

    fn get_balance_history(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<BalanceLedgerEntry>>;
}
