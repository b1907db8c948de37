use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::withdrawals_model::{NewWithdrawal, Withdrawal, WithdrawalStatus};
use super::withdrawals_traits::{WithdrawalRepositoryTrait, WithdrawalServiceTrait};
use crate::auth::Principal;
use crate::balances::{self, BalanceReason};
use crate::errors::{Error, Result};
use crate::ledger::{
    retry_on_conflict, EntityWrite, LedgerCommit, LedgerStoreTrait, TransactionWrite,
};
use crate::notifications::{format_amount, Notification, NotificationKind, NotificationSink};
use crate::settings::PlatformSettings;
use crate::transactions::{Transaction, TransactionMetadata, TransactionStatus, WithdrawalMeta};
use crate::users::UserRepositoryTrait;

pub struct WithdrawalService {
    repository: Arc<dyn WithdrawalRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
    ledger_store: Arc<dyn LedgerStoreTrait>,
    notification_sink: Arc<dyn NotificationSink>,
    settings: PlatformSettings,
}

impl WithdrawalService {
    pub fn new(
        repository: Arc<dyn WithdrawalRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
        ledger_store: Arc<dyn LedgerStoreTrait>,
        notification_sink: Arc<dyn NotificationSink>,
        settings: PlatformSettings,
    ) -> Self {
        Self {
            repository,
            user_repository,
            ledger_store,
            notification_sink,
            settings,
        }
    }

    /// Balance a new request may draw on.
    fn available_for_request(&self, user_id: &str, balance: Decimal) -> Result<Decimal> {
        if self.settings.withdrawal_policy.reserve_on_request {
            Ok(balance - self.repository.pending_total(user_id)?)
        } else {
            Ok(balance)
        }
    }

    fn notify_user(&self, withdrawal: &Withdrawal, kind: NotificationKind, title: &str, message: String) {
        self.notification_sink.notify(Notification::to_user(
            &withdrawal.user_id,
            kind,
            title,
            message,
            Some(&withdrawal.id),
        ));
    }
}

#[async_trait]
impl WithdrawalServiceTrait for WithdrawalService {
    async fn request_withdrawal(
        &self,
        principal: &Principal,
        request: NewWithdrawal,
    ) -> Result<Withdrawal> {
        request.validate()?;
        let user = self.user_repository.get_by_id(&principal.user_id)?;

        let available = self.available_for_request(&user.id, user.balance)?;
        if request.amount > available {
            warn!(
                "Withdrawal request of {} by user {} exceeds available {}",
                request.amount, user.id, available
            );
            return Err(Error::InsufficientBalance {
                user_id: user.id,
                available,
                requested: request.amount,
            });
        }

        let now = Utc::now().naive_utc();
        let mut record = Transaction::new(
            &user.id,
            TransactionStatus::Pending,
            request.amount,
            TransactionMetadata::Withdrawal(WithdrawalMeta {
                withdrawal_id: String::new(),
            }),
            now,
        );
        let withdrawal = Withdrawal::new(&user.id, request, &record.id, now);
        record.metadata = TransactionMetadata::Withdrawal(WithdrawalMeta {
            withdrawal_id: withdrawal.id.clone(),
        });

        self.ledger_store
            .commit(
                LedgerCommit::new()
                    .with_withdrawal(EntityWrite::Insert(withdrawal.clone()))
                    .with_transaction(TransactionWrite::Insert(record)),
            )
            .await?;

        info!(
            "Withdrawal {} of {} requested by user {}",
            withdrawal.id, withdrawal.amount, user.id
        );
        let mut notifications = vec![Notification::to_user(
            &user.id,
            NotificationKind::WithdrawalRequested,
            "Withdrawal requested",
            format!(
                "Your withdrawal of {} is awaiting approval.",
                format_amount(withdrawal.amount)
            ),
            Some(&withdrawal.id),
        )];
        if let Some(email) = &self.settings.admin_email {
            notifications.push(Notification::to_admin(
                email,
                NotificationKind::WithdrawalRequested,
                "Withdrawal to review",
                format!(
                    "User {} requested a withdrawal of {} to {}.",
                    user.email,
                    format_amount(withdrawal.amount),
                    withdrawal.bank_details.bank_name
                ),
                Some(&withdrawal.id),
            ));
        }
        self.notification_sink.notify_batch(notifications);
        Ok(withdrawal)
    }

    async fn approve_withdrawal(
        &self,
        principal: &Principal,
        withdrawal_id: &str,
        notes: Option<String>,
    ) -> Result<Withdrawal> {
        principal.require_admin()?;
        let notes = notes.as_deref();

        let (withdrawal, balance) = retry_on_conflict("approve_withdrawal", || async move {
            let mut withdrawal = self.repository.get_by_id(withdrawal_id)?;
            withdrawal.complete(
                &principal.user_id,
                notes.map(str::to_string),
                Utc::now().naive_utc(),
            )?;

            // Fail early with the balance we can see; the debit guard is
            // checked again by the store against the balance it commits on.
            let user = self.user_repository.get_by_id(&withdrawal.user_id)?;
            if withdrawal.amount > user.balance {
                return Err(Error::InsufficientBalance {
                    user_id: user.id,
                    available: user.balance,
                    requested: withdrawal.amount,
                });
            }
            let payout = balances::debit(
                &withdrawal.user_id,
                withdrawal.amount,
                BalanceReason::WithdrawalPayout,
                Some(withdrawal.id.clone()),
            )?;

            let write = EntityWrite::update(withdrawal);
            let updated = write.record().clone();
            let receipt = self
                .ledger_store
                .commit(
                    LedgerCommit::new()
                        .with_withdrawal(write)
                        .with_balance_change(payout)
                        .with_transaction(TransactionWrite::SetStatus {
                            transaction_id: updated.transaction_id.clone(),
                            status: TransactionStatus::Completed,
                        }),
                )
                .await?;
            let balance = receipt.balance_of(&updated.user_id);
            Ok((updated, balance))
        })
        .await?;

        info!(
            "Withdrawal {} of {} completed by {}, balance now {:?}",
            withdrawal.id, withdrawal.amount, principal.user_id, balance
        );
        self.notify_user(
            &withdrawal,
            NotificationKind::WithdrawalCompleted,
            "Withdrawal completed",
            format!(
                "{} has been sent to your {} account.",
                format_amount(withdrawal.amount),
                withdrawal.bank_details.bank_name
            ),
        );
        Ok(withdrawal)
    }

    async fn reject_withdrawal(
        &self,
        principal: &Principal,
        withdrawal_id: &str,
        notes: Option<String>,
    ) -> Result<Withdrawal> {
        principal.require_admin()?;
        let notes = notes.as_deref();

        let withdrawal = retry_on_conflict("reject_withdrawal", || async move {
            let mut withdrawal = self.repository.get_by_id(withdrawal_id)?;
            withdrawal.reject(
                &principal.user_id,
                notes.map(str::to_string),
                Utc::now().naive_utc(),
            )?;

            let write = EntityWrite::update(withdrawal);
            let updated = write.record().clone();
            self.ledger_store
                .commit(
                    LedgerCommit::new()
                        .with_withdrawal(write)
                        .with_transaction(TransactionWrite::SetStatus {
                            transaction_id: updated.transaction_id.clone(),
                            status: TransactionStatus::Rejected,
                        }),
                )
                .await?;
            Ok(updated)
        })
        .await?;

        info!(
            "Withdrawal {} rejected by {}",
            withdrawal.id, principal.user_id
        );
        let message = match notes {
            Some(notes) => format!("Your withdrawal request was declined: {}", notes),
            None => "Your withdrawal request was declined.".to_string(),
        };
        self.notify_user(
            &withdrawal,
            NotificationKind::WithdrawalRejected,
            "Withdrawal declined",
            message,
        );
        Ok(withdrawal)
    }

    fn get_withdrawal(&self, principal: &Principal, withdrawal_id: &str) -> Result<Withdrawal> {
        let withdrawal = self.repository.get_by_id(withdrawal_id)?;
        principal.require_owner_or_admin(&withdrawal.user_id)?;
        Ok(withdrawal)
    }

    fn list_user_withdrawals(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<Withdrawal>> {
        principal.require_owner_or_admin(user_id)?;
        self.repository.list(Some(user_id), None)
    }

    fn list_by_status(
        &self,
        principal: &Principal,
        status: WithdrawalStatus,
    ) -> Result<Vec<Withdrawal>> {
        principal.require_admin()?;
        self.repository.list(None, Some(status))
    }
}
