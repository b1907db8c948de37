use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

use super::investment_state::{InvestmentAction, InvestmentState};
use super::investments_model::{Investment, InvestmentFilter, NewInvestment, PortfolioSummary};
use super::investments_traits::{InvestmentRepositoryTrait, InvestmentServiceTrait};
use crate::assets::AssetRepositoryTrait;
use crate::auth::Principal;
use crate::balances::{self, BalanceReason};
use crate::errors::{Error, Result, ValidationError};
use crate::ledger::{
    retry_on_conflict, AssetGuard, EntityWrite, LedgerCommit, LedgerStoreTrait,
    TransactionWrite,
};
use crate::notifications::{format_amount, Notification, NotificationKind, NotificationSink};
use crate::settings::PlatformSettings;
use crate::transactions::{
    ClosureMeta, DepositMeta, Transaction, TransactionMetadata, TransactionStatus,
};
use crate::users::UserRepositoryTrait;

/// Drives investments through their lifecycle.
///
/// Every transition re-reads the investment, validates it against the state
/// table and commits the new state together with its balance change and
/// audit records. Lost version races are retried against fresh data.
pub struct InvestmentService {
    repository: Arc<dyn InvestmentRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
    ledger_store: Arc<dyn LedgerStoreTrait>,
    notification_sink: Arc<dyn NotificationSink>,
    settings: PlatformSettings,
}

impl InvestmentService {
    pub fn new(
        repository: Arc<dyn InvestmentRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
        ledger_store: Arc<dyn LedgerStoreTrait>,
        notification_sink: Arc<dyn NotificationSink>,
        settings: PlatformSettings,
    ) -> Self {
        Self {
            repository,
            asset_repository,
            user_repository,
            ledger_store,
            notification_sink,
            settings,
        }
    }

    /// Notifies the owner, and the admin inbox when `admin_title` is given.
    fn notify(
        &self,
        investment: &Investment,
        kind: NotificationKind,
        title: &str,
        message: String,
        admin_title: Option<&str>,
    ) {
        let mut notifications = vec![Notification::to_user(
            &investment.user_id,
            kind,
            title,
            message.clone(),
            Some(&investment.id),
        )];
        if let (Some(admin_title), Some(email)) = (admin_title, &self.settings.admin_email) {
            notifications.push(Notification::to_admin(
                email,
                kind,
                admin_title,
                format!("User {}: {}", investment.user_id, message),
                Some(&investment.id),
            ));
        }
        self.notification_sink.notify_batch(notifications);
    }
}

#[async_trait]
impl InvestmentServiceTrait for InvestmentService {
    async fn create_investment(
        &self,
        principal: &Principal,
        new_investment: NewInvestment,
    ) -> Result<Investment> {
        principal.require_owner_or_admin(&new_investment.user_id)?;
        new_investment.validate()?;

        let user = self.user_repository.get_by_id(&new_investment.user_id)?;
        let asset = self.asset_repository.get_by_id(&new_investment.asset_id)?;
        if !asset.is_active {
            return Err(Error::invalid_input(format!(
                "Asset {} is not open for investment",
                asset.symbol
            )));
        }
        if new_investment.amount < asset.min_investment {
            return Err(Error::Validation(ValidationError::BelowMinimum {
                amount: new_investment.amount,
                minimum: asset.min_investment,
            }));
        }

        let now = Utc::now().naive_utc();
        let mut deposit = Transaction::new(
            &user.id,
            TransactionStatus::Pending,
            new_investment.amount,
            TransactionMetadata::Deposit(DepositMeta {
                investment_id: String::new(),
                asset_id: asset.id.clone(),
                deposit_method: new_investment.deposit_method.trim().to_string(),
            }),
            now,
        );
        let investment = Investment::open(&user.id, &asset, &new_investment, &deposit.id, now)?;
        if let TransactionMetadata::Deposit(meta) = &mut deposit.metadata {
            meta.investment_id = investment.id.clone();
        }

        self.ledger_store
            .commit(
                LedgerCommit::new()
                    .with_asset_guard(AssetGuard::active(&asset.id))
                    .with_investment(EntityWrite::Insert(investment.clone()))
                    .with_transaction(TransactionWrite::Insert(deposit)),
            )
            .await?;

        info!(
            "Investment {} created: user {} bought {} of {} at {}",
            investment.id, user.id, investment.quantity, asset.symbol, investment.purchase_price
        );
        self.notify(
            &investment,
            NotificationKind::DepositReceived,
            "Deposit received",
            format!(
                "Your deposit of {} into {} is awaiting approval.",
                format_amount(investment.amount),
                asset.name
            ),
            Some("New deposit to review"),
        );
        Ok(investment)
    }

    async fn approve_investment(
        &self,
        principal: &Principal,
        investment_id: &str,
    ) -> Result<Investment> {
        principal.require_admin()?;

        let investment = retry_on_conflict("approve_investment", || async move {
            let mut investment = self.repository.get_by_id(investment_id)?;
            investment.approve(&principal.user_id, Utc::now().naive_utc())?;

            let write = EntityWrite::update(investment);
            let updated = write.record().clone();
            self.ledger_store
                .commit(
                    LedgerCommit::new()
                        .with_investment(write)
                        .with_transaction(TransactionWrite::SetStatus {
                            transaction_id: updated.deposit_transaction_id.clone(),
                            status: TransactionStatus::Approved,
                        }),
                )
                .await?;
            Ok(updated)
        })
        .await?;

        info!(
            "Investment {} approved by {}",
            investment.id, principal.user_id
        );
        self.notify(
            &investment,
            NotificationKind::InvestmentApproved,
            "Investment approved",
            format!(
                "Your investment of {} is now active.",
                format_amount(investment.amount)
            ),
            None,
        );
        Ok(investment)
    }

    async fn reject_investment(
        &self,
        principal: &Principal,
        investment_id: &str,
        reason: Option<String>,
    ) -> Result<Investment> {
        principal.require_admin()?;
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let reason = reason.as_deref();

        let investment = retry_on_conflict("reject_investment", || async move {
            let mut investment = self.repository.get_by_id(investment_id)?;
            investment.reject(reason.map(str::to_string), Utc::now().naive_utc())?;

            let write = EntityWrite::update(investment);
            let updated = write.record().clone();
            self.ledger_store
                .commit(
                    LedgerCommit::new()
                        .with_investment(write)
                        .with_transaction(TransactionWrite::SetStatus {
                            transaction_id: updated.deposit_transaction_id.clone(),
                            status: TransactionStatus::Rejected,
                        }),
                )
                .await?;
            Ok(updated)
        })
        .await?;

        info!(
            "Investment {} rejected by {}",
            investment.id, principal.user_id
        );
        let message = match reason {
            Some(reason) => format!("Your deposit was not approved: {}", reason),
            None => "Your deposit was not approved.".to_string(),
        };
        self.notify(
            &investment,
            NotificationKind::InvestmentRejected,
            "Investment rejected",
            message,
            None,
        );
        Ok(investment)
    }

    async fn request_closure(
        &self,
        principal: &Principal,
        investment_id: &str,
    ) -> Result<Investment> {
        let investment = retry_on_conflict("request_closure", || async move {
            let mut investment = self.repository.get_by_id(investment_id)?;
            principal.require_owner(&investment.user_id)?;
            investment.request_closure(Utc::now().naive_utc())?;

            let write = EntityWrite::update(investment);
            let updated = write.record().clone();
            self.ledger_store
                .commit(LedgerCommit::new().with_investment(write))
                .await?;
            Ok(updated)
        })
        .await?;

        info!("Closure of investment {} requested", investment.id);
        self.notify(
            &investment,
            NotificationKind::ClosureRequested,
            "Closure requested",
            format!(
                "Closure of your investment currently worth {} is awaiting approval.",
                format_amount(investment.current_value)
            ),
            Some("Closure request to review"),
        );
        Ok(investment)
    }

    async fn approve_closure(
        &self,
        principal: &Principal,
        investment_id: &str,
        notes: Option<String>,
    ) -> Result<Investment> {
        principal.require_admin()?;
        let notes = notes.as_deref();

        let investment = retry_on_conflict("approve_closure", || async move {
            let mut investment = self.repository.get_by_id(investment_id)?;
            let now = Utc::now().naive_utc();
            investment.state.transition(InvestmentAction::ApproveClosure)?;

            // Settle at the asset's current price. A pass still running for an
            // earlier price update has not reached this position yet.
            let asset = self.asset_repository.get_by_id(&investment.asset_id)?;
            let catch_up = investment.revalue(asset.current_price, now)?;
            investment.approve_closure(&principal.user_id, notes.map(str::to_string), now)?;

            let mut commit = LedgerCommit::new().with_asset_guard(AssetGuard::unchanged(&asset));
            if !catch_up.is_zero() {
                commit = commit.with_balance_change(balances::mark_to_market(
                    &investment.user_id,
                    catch_up,
                    &investment.id,
                ));
            }
            let settlement = balances::credit(
                &investment.user_id,
                investment.current_value,
                BalanceReason::ClosureSettlement,
                Some(investment.id.clone()),
            )?;
            let record = Transaction::new(
                &investment.user_id,
                TransactionStatus::Completed,
                investment.current_value,
                TransactionMetadata::Closure(ClosureMeta {
                    investment_id: investment.id.clone(),
                    asset_id: investment.asset_id.clone(),
                    amount_invested: investment.amount,
                    profit_loss: investment.profit_loss,
                    profit_loss_percent: investment.profit_loss_percent()?,
                    approved_by: principal.user_id.clone(),
                }),
                now,
            );

            let write = EntityWrite::update(investment);
            let updated = write.record().clone();
            let receipt = self
                .ledger_store
                .commit(
                    commit
                        .with_investment(write)
                        .with_balance_change(settlement)
                        .with_transaction(TransactionWrite::Insert(record)),
                )
                .await?;
            debug!(
                "User {} balance after closure settlement: {:?}",
                updated.user_id,
                receipt.balance_of(&updated.user_id)
            );
            Ok(updated)
        })
        .await?;

        info!(
            "Closure of investment {} approved by {}: credited {}",
            investment.id, principal.user_id, investment.current_value
        );
        self.notify(
            &investment,
            NotificationKind::ClosureApproved,
            "Investment closed",
            format!(
                "{} was credited to your balance (profit/loss {}).",
                format_amount(investment.current_value),
                format_amount(investment.profit_loss)
            ),
            None,
        );
        Ok(investment)
    }

    async fn reject_closure(
        &self,
        principal: &Principal,
        investment_id: &str,
        reason: &str,
    ) -> Result<Investment> {
        principal.require_admin()?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "reason".to_string(),
            )));
        }

        let investment = retry_on_conflict("reject_closure", || async move {
            let mut investment = self.repository.get_by_id(investment_id)?;
            investment.reject_closure(reason, Utc::now().naive_utc())?;

            let write = EntityWrite::update(investment);
            let updated = write.record().clone();
            self.ledger_store
                .commit(LedgerCommit::new().with_investment(write))
                .await?;
            Ok(updated)
        })
        .await?;

        info!(
            "Closure of investment {} rejected by {}",
            investment.id, principal.user_id
        );
        self.notify(
            &investment,
            NotificationKind::ClosureRejected,
            "Closure request declined",
            format!("Your investment stays active: {}", reason),
            None,
        );
        Ok(investment)
    }

    fn get_investment(&self, principal: &Principal, investment_id: &str) -> Result<Investment> {
        let investment = self.repository.get_by_id(investment_id)?;
        principal.require_owner_or_admin(&investment.user_id)?;
        Ok(investment)
    }

    fn list_user_investments(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<Investment>> {
        principal.require_owner_or_admin(user_id)?;
        self.repository.list(&InvestmentFilter::for_user(user_id))
    }

    fn list_by_state(
        &self,
        principal: &Principal,
        state: InvestmentState,
    ) -> Result<Vec<Investment>> {
        principal.require_admin()?;
        self.repository
            .list(&InvestmentFilter::default().in_states(&[state]))
    }

    fn get_portfolio_summary(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<PortfolioSummary> {
        principal.require_owner_or_admin(user_id)?;
        let user = self.user_repository.get_by_id(user_id)?;
        let investments = self.repository.list(
            &InvestmentFilter::for_user(user_id).in_states(&[
                InvestmentState::Pending,
                InvestmentState::Active,
                InvestmentState::ClosureRequested,
            ]),
        )?;
        PortfolioSummary::from_investments(user_id, user.balance, &investments)
    }
}
