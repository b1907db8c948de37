use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::balances_model::{
    credit, debit, reset, AdjustmentMode, BalanceAdjustment, BalanceAdjustmentResult,
    BalanceLedgerEntry, BalanceReason,
};
use super::balances_traits::{BalanceLedgerRepositoryTrait, BalanceServiceTrait};
use crate::auth::Principal;
use crate::errors::{Error, Result};
use crate::ledger::{retry_on_conflict, LedgerCommit, LedgerStoreTrait, TransactionWrite};
use crate::notifications::{format_amount, Notification, NotificationKind, NotificationSink};
use crate::transactions::{AdjustmentMeta, Transaction, TransactionMetadata, TransactionStatus};
use crate::users::UserRepositoryTrait;

pub struct BalanceService {
    user_repository: Arc<dyn UserRepositoryTrait>,
    ledger_repository: Arc<dyn BalanceLedgerRepositoryTrait>,
    ledger_store: Arc<dyn LedgerStoreTrait>,
    notification_sink: Arc<dyn NotificationSink>,
}

impl BalanceService {
    pub fn new(
        user_repository: Arc<dyn UserRepositoryTrait>,
        ledger_repository: Arc<dyn BalanceLedgerRepositoryTrait>,
        ledger_store: Arc<dyn LedgerStoreTrait>,
        notification_sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            user_repository,
            ledger_repository,
            ledger_store,
            notification_sink,
        }
    }
}

#[async_trait]
impl BalanceServiceTrait for BalanceService {
    async fn adjust_balance(
        &self,
        principal: &Principal,
        user_id: &str,
        adjustment: BalanceAdjustment,
    ) -> Result<BalanceAdjustmentResult> {
        principal.require_admin()?;
        adjustment.validate()?;
        let adjustment = &adjustment;

        let result = retry_on_conflict("adjust_balance", || async move {
            let user = self.user_repository.get_by_id(user_id)?;
            let record_id = uuid::Uuid::new_v4().to_string();
            let change = match adjustment.mode {
                AdjustmentMode::Set => reset(
                    &user.id,
                    user.balance,
                    adjustment.amount,
                    Some(record_id.clone()),
                )?,
                AdjustmentMode::Increase => credit(
                    &user.id,
                    adjustment.amount,
                    BalanceReason::AdminAdjustment,
                    Some(record_id.clone()),
                )?,
                AdjustmentMode::Decrease => debit(
                    &user.id,
                    adjustment.amount,
                    BalanceReason::AdminAdjustment,
                    Some(record_id.clone()),
                )?,
            };

            let mut record = Transaction::new(
                &user.id,
                TransactionStatus::Completed,
                change.delta(),
                TransactionMetadata::Adjustment(AdjustmentMeta {
                    admin_id: principal.user_id.clone(),
                    mode: adjustment.mode,
                    requested_amount: adjustment.amount,
                    reason: adjustment.reason.trim().to_string(),
                }),
                Utc::now().naive_utc(),
            );
            record.id = record_id;
            let delta = change.delta();

            let receipt = self
                .ledger_store
                .commit(
                    LedgerCommit::new()
                        .with_balance_change(change)
                        .with_transaction(TransactionWrite::Insert(record.clone())),
                )
                .await?;
            let balance = receipt.balance_of(&user.id).ok_or_else(|| {
                Error::Unexpected(format!("commit did not report a balance for {}", user.id))
            })?;

            Ok(BalanceAdjustmentResult {
                user_id: user.id,
                transaction_id: record.id,
                delta,
                balance,
            })
        })
        .await?;

        info!(
            "Balance of user {} adjusted by {} ({:?}): {} -> {}",
            result.user_id,
            principal.user_id,
            adjustment.mode,
            result.delta,
            result.balance
        );
        self.notification_sink.notify(Notification::to_user(
            &result.user_id,
            NotificationKind::BalanceAdjusted,
            "Balance adjusted",
            format!(
                "Your balance was adjusted by {}. New balance: {}.",
                format_amount(result.delta),
                format_amount(result.balance)
            ),
            Some(&result.transaction_id),
        ));
        Ok(result)
    }

    fn get_balance(&self, principal: &Principal, user_id: &str) -> Result<Decimal> {
        principal.require_owner_or_admin(user_id)?;
        Ok(self.user_repository.get_by_id(user_id)?.balance)
    }

    fn get_balance_history(
        &self,
        principal: &Principal,
        user_id: &str,
    ) -> Result<Vec<BalanceLedgerEntry>> {
        principal.require_owner_or_admin(user_id)?;
        self.ledger_repository.list_by_user(user_id)
    }
}
