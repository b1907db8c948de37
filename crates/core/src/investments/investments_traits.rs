//! Investment repository and service traits.

use async_trait::async_trait;

use super::investment_state::InvestmentState;
use super::investments_model::{Investment, InvestmentFilter, NewInvestment, PortfolioSummary};
use crate::auth::Principal;
use crate::errors::Result;

/// Read access to investments. Every write is a ledger commit.
pub trait InvestmentRepositoryTrait: Send + Sync {
    fn get_by_id(&self, investment_id: &str) -> Result<Investment>;

    /// Newest first.
    fn list(&self, filter: &InvestmentFilter) -> Result<Vec<Investment>>;
}

#[async_trait]
pub trait InvestmentServiceTrait: Send + Sync {
    async fn create_investment(
        &self,
        principal: &Principal,
        new_investment: NewInvestment,
    ) -> Result<Investment>;

    async fn approve_investment(
        &self,
        principal: &Principal,
        investment_id: &str,
    ) -> Result<Investment>;

    async fn reject_investment(
        &self,
        principal: &Principal,
        investment_id: &str,
        reason: Option<String>,
    ) -> Result<Investment>;

    async fn request_closure(
        &self,
        principal: &Principal,
        investment_id: &str,
    ) -> Result<Investment>;

    /// Credits the current value to the owner exactly once.
    async fn approve_closure(
        &self,
        principal: &Principal,
        investment_id: &str,
        notes: Option<String>,
    ) -> Result<Investment>;

    async fn reject_closure(
        &self,
        principal: &Principal,
        investment_id: &str,
        reason: &str,
    ) -> Result<Investment>;

    fn get_investment(&self, principal: &Principal, investment_id: &str) -> Result<Investment>;

    fn list_user_investments(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<Investment>>;

    fn list_by_state(
        &self,
        principal: &Principal,
        state: InvestmentState,
    ) -> Result<Vec<Investment>>;

    fn get_portfolio_summary(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<PortfolioSummary>;
}
