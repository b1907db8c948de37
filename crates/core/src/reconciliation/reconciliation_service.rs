use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::reconciliation_model::{ReconciliationFailure, ReconciliationReport};
use super::reconciliation_traits::ReconciliationServiceTrait;
use crate::assets::Asset;
use crate::balances;
use crate::errors::{Error, Result};
use crate::investments::{
    Investment, InvestmentFilter, InvestmentRepositoryTrait, InvestmentState,
};
use crate::ledger::{retry_on_conflict, EntityWrite, LedgerCommit, LedgerStoreTrait};

enum Revaluation {
    Updated { user_id: String, delta: Decimal },
    Unchanged,
    /// No longer open when re-read after a lost race.
    Skipped,
}

pub struct ReconciliationService {
    investment_repository: Arc<dyn InvestmentRepositoryTrait>,
    ledger_store: Arc<dyn LedgerStoreTrait>,
}

impl ReconciliationService {
    pub fn new(
        investment_repository: Arc<dyn InvestmentRepositoryTrait>,
        ledger_store: Arc<dyn LedgerStoreTrait>,
    ) -> Self {
        Self {
            investment_repository,
            ledger_store,
        }
    }

    /// Revalues one investment and applies the profit/loss delta to its
    /// owner in the same commit.
    async fn revalue(&self, listed: Investment, price: Decimal) -> Result<Revaluation> {
        let investment_id = listed.id.clone();
        let investment_id = investment_id.as_str();
        let mut listed = Some(listed);

        retry_on_conflict("reconcile_investment", || {
            // The listed copy is used once; retries work on a fresh read.
            let current = match listed.take() {
                Some(investment) => Ok(investment),
                None => self.investment_repository.get_by_id(investment_id),
            };
            async move {
                let mut investment = current?;
                if !investment.is_active() {
                    return Ok(Revaluation::Skipped);
                }
                let previous_value = investment.current_value;
                let delta = investment.revalue(price, Utc::now().naive_utc())?;
                if delta.is_zero() && investment.current_value == previous_value {
                    return Ok(Revaluation::Unchanged);
                }

                let user_id = investment.user_id.clone();
                let change = balances::mark_to_market(&user_id, delta, &investment.id);
                self.ledger_store
                    .commit(
                        LedgerCommit::new()
                            .with_investment(EntityWrite::update(investment))
                            .with_balance_change(change),
                    )
                    .await?;
                Ok(Revaluation::Updated { user_id, delta })
            }
        })
        .await
    }
}

#[async_trait]
impl ReconciliationServiceTrait for ReconciliationService {
    async fn reconcile_asset(
        &self,
        asset: &Asset,
        old_price: Decimal,
    ) -> Result<ReconciliationReport> {
        let new_price = asset.current_price;
        let mut report = ReconciliationReport::new(&asset.id, old_price, new_price);
        let investments = self.investment_repository.list(
            &InvestmentFilter::for_asset(&asset.id).in_states(&InvestmentState::OPEN_POSITIONS),
        )?;
        debug!(
            "Reconciling {} open investments in {} at {}",
            investments.len(),
            asset.symbol,
            new_price
        );

        let mut seen = HashSet::new();
        for investment in investments {
            if !seen.insert(investment.id.clone()) {
                continue;
            }
            let investment_id = investment.id.clone();
            match self.revalue(investment, new_price).await {
                Ok(Revaluation::Updated { user_id, delta }) => {
                    report.record_update(&user_id, delta);
                }
                Ok(Revaluation::Unchanged) => report.investments_unchanged += 1,
                Ok(Revaluation::Skipped) => {
                    debug!("Investment {} closed during reconciliation", investment_id);
                    report.skipped.push(investment_id);
                }
                Err(e) => {
                    warn!(
                        "Failed to reconcile investment {} in {}: {}",
                        investment_id, asset.symbol, e
                    );
                    report.failed.push(ReconciliationFailure {
                        investment_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Reconciled {} at {} -> {}: {} updated, {} unchanged, {} skipped, {} failed, total delta {}",
            asset.symbol,
            old_price,
            new_price,
            report.investments_updated,
            report.investments_unchanged,
            report.skipped.len(),
            report.failed.len(),
            report.total_delta
        );
        Ok(report)
    }

    fn check_price(&self, asset_id: &str, price: Decimal) -> Result<()> {
        let investments = self.investment_repository.list(
            &InvestmentFilter::for_asset(asset_id).in_states(&InvestmentState::OPEN_POSITIONS),
        )?;
        let now = Utc::now().naive_utc();
        for mut investment in investments {
            if let Err(e) = investment.revalue(price, now) {
                warn!(
                    "Price {} rejected for asset {}: investment {}: {}",
                    price, asset_id, investment.id, e
                );
                return Err(Error::invalid_input(format!(
                    "Price {} is out of range for open investments in asset {}",
                    price, asset_id
                )));
            }
        }
        Ok(())
    }
}
