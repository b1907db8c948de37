//! Withdrawal repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::withdrawals_model::{NewWithdrawal, Withdrawal, WithdrawalStatus};
use crate::auth::Principal;
use crate::errors::Result;

/// Read access to withdrawals. Every write is a ledger commit.
pub trait WithdrawalRepositoryTrait: Send + Sync {
    fn get_by_id(&self, withdrawal_id: &str) -> Result<Withdrawal>;

    /// Newest first.
    fn list(
        &self,
        user_id: Option<&str>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>>;

    /// Sum of the user's PENDING withdrawal amounts.
    fn pending_total(&self, user_id: &str) -> Result<Decimal>;
}

#[async_trait]
pub trait WithdrawalServiceTrait: Send + Sync {
    /// Requests a cash-out of the caller's own balance.
    async fn request_withdrawal(
        &self,
        principal: &Principal,
        request: NewWithdrawal,
    ) -> Result<Withdrawal>;

    async fn approve_withdrawal(
        &self,
        principal: &Principal,
        withdrawal_id: &str,
        notes: Option<String>,
    ) -> Result<Withdrawal>;

    async fn reject_withdrawal(
        &self,
        principal: &Principal,
        withdrawal_id: &str,
        notes: Option<String>,
    ) -> Result<Withdrawal>;

    fn get_withdrawal(&self, principal: &Principal, withdrawal_id: &str) -> Result<Withdrawal>;

    fn list_user_withdrawals(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<Withdrawal>>;

    fn list_by_status(
        &self,
        principal: &Principal,
        status: WithdrawalStatus,
    ) -> Result<Vec<Withdrawal>>;
}
