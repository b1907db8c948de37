//! Investment domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::investment_state::{InvestmentAction, InvestmentState};
use crate::assets::Asset;
use crate::errors::{Error, Result, ValidationError};
use crate::ledger::{self, Versioned};

/// One user's stake in one asset, bought at one price.
///
/// `amount`, `quantity` and `purchase_price` are fixed at creation. Only
/// `current_value` and `profit_loss` move afterwards, through [`Investment::revalue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub user_id: String,
    pub asset_id: String,
    pub amount: Decimal,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub deposit_method: String,
    pub deposit_proof: Option<String>,
    /// The PENDING deposit transaction created with the investment.
    pub deposit_transaction_id: String,
    pub state: InvestmentState,
    pub approved_at: Option<NaiveDateTime>,
    pub approved_by: Option<String>,
    pub rejected_at: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
    pub closure_requested_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
    pub closure_approved_by: Option<String>,
    pub closure_rejected_at: Option<NaiveDateTime>,
    pub closure_notes: Option<String>,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Investment {
    /// Opens a pending investment of `amount` in `asset` at its current price.
    pub fn open(
        user_id: &str,
        asset: &Asset,
        new_investment: &NewInvestment,
        deposit_transaction_id: &str,
        at: NaiveDateTime,
    ) -> Result<Self> {
        let quantity = ledger::quantity(new_investment.amount, asset.current_price)?;
        let valuation = ledger::value_at(quantity, new_investment.amount, asset.current_price)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            asset_id: asset.id.clone(),
            amount: new_investment.amount,
            quantity,
            purchase_price: asset.current_price,
            current_value: valuation.current_value,
            profit_loss: valuation.profit_loss,
            deposit_method: new_investment.deposit_method.trim().to_string(),
            deposit_proof: new_investment.deposit_proof.clone(),
            deposit_transaction_id: deposit_transaction_id.to_string(),
            state: InvestmentState::Pending,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejection_reason: None,
            closure_requested_at: None,
            closed_at: None,
            closure_approved_by: None,
            closure_rejected_at: None,
            closure_notes: None,
            version: 0,
            created_at: at,
            updated_at: at,
        })
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn closure_requested(&self) -> bool {
        self.state == InvestmentState::ClosureRequested
    }

    pub fn profit_loss_percent(&self) -> Result<Decimal> {
        ledger::profit_loss_percent(self.profit_loss, self.amount)
    }

    fn advance(&mut self, action: InvestmentAction, at: NaiveDateTime) -> Result<()> {
        self.state = self.state.transition(action)?;
        self.updated_at = at;
        Ok(())
    }

    pub fn approve(&mut self, admin_id: &str, at: NaiveDateTime) -> Result<()> {
        self.advance(InvestmentAction::Approve, at)?;
        self.approved_at = Some(at);
        self.approved_by = Some(admin_id.to_string());
        Ok(())
    }

    pub fn reject(&mut self, reason: Option<String>, at: NaiveDateTime) -> Result<()> {
        self.advance(InvestmentAction::Reject, at)?;
        self.rejected_at = Some(at);
        self.rejection_reason = reason;
        Ok(())
    }

    pub fn request_closure(&mut self, at: NaiveDateTime) -> Result<()> {
        self.advance(InvestmentAction::RequestClosure, at)?;
        self.closure_requested_at = Some(at);
        Ok(())
    }

    pub fn approve_closure(
        &mut self,
        admin_id: &str,
        notes: Option<String>,
        at: NaiveDateTime,
    ) -> Result<()> {
        self.advance(InvestmentAction::ApproveClosure, at)?;
        self.closed_at = Some(at);
        self.closure_approved_by = Some(admin_id.to_string());
        if notes.is_some() {
            self.closure_notes = notes;
        }
        Ok(())
    }

    pub fn reject_closure(&mut self, reason: &str, at: NaiveDateTime) -> Result<()> {
        self.advance(InvestmentAction::RejectClosure, at)?;
        self.closure_rejected_at = Some(at);
        self.closure_notes = Some(reason.to_string());
        Ok(())
    }

    /// Marks the position to `price` and returns the change in profit/loss.
    ///
    /// Only open positions can be revalued.
    pub fn revalue(&mut self, price: Decimal, at: NaiveDateTime) -> Result<Decimal> {
        if !self.is_active() {
            return Err(Error::InvalidState(format!(
                "cannot revalue investment {} while it is {}",
                self.id, self.state
            )));
        }
        let valuation = ledger::value_at(self.quantity, self.amount, price)?;
        let delta = valuation
            .profit_loss
            .checked_sub(self.profit_loss)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "Revaluing investment {} at {} is out of range",
                    self.id, price
                ))
            })?;
        self.current_value = valuation.current_value;
        self.profit_loss = valuation.profit_loss;
        self.updated_at = at;
        Ok(delta)
    }
}

impl Versioned for Investment {
    fn version(&self) -> i64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// Input model for a deposit into an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
    pub user_id: String,
    pub asset_id: String,
    pub amount: Decimal,
    pub deposit_method: String,
    /// Opaque reference to the proof the user uploaded.
    pub deposit_proof: Option<String>,
}

impl NewInvestment {
    pub fn validate(&self) -> Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "assetId".to_string(),
            )));
        }
        if self.deposit_method.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "depositMethod".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::invalid_input("Investment amount must be positive"));
        }
        Ok(())
    }
}

/// Filter for investment list queries. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestmentFilter {
    pub user_id: Option<String>,
    pub asset_id: Option<String>,
    pub states: Option<Vec<InvestmentState>>,
}

impl InvestmentFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_asset(asset_id: &str) -> Self {
        Self {
            asset_id: Some(asset_id.to_string()),
            ..Default::default()
        }
    }

    pub fn in_states(mut self, states: &[InvestmentState]) -> Self {
        self.states = Some(states.to_vec());
        self
    }

    pub fn matches(&self, investment: &Investment) -> bool {
        self.user_id
            .as_deref()
            .map_or(true, |id| investment.user_id == id)
            && self
                .asset_id
                .as_deref()
                .map_or(true, |id| investment.asset_id == id)
            && self
                .states
                .as_ref()
                .map_or(true, |states| states.contains(&investment.state))
    }
}

/// A user's open positions and cash at a glance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub user_id: String,
    pub balance: Decimal,
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percent: Decimal,
    pub active_investments: usize,
    pub pending_investments: usize,
}

impl PortfolioSummary {
    /// Sums open positions; pending ones are only counted.
    pub fn from_investments(
        user_id: &str,
        balance: Decimal,
        investments: &[Investment],
    ) -> Result<Self> {
        let open: Vec<&Investment> = investments.iter().filter(|i| i.is_active()).collect();
        let total_invested = checked_sum(open.iter().map(|i| i.amount))?;
        let current_value = checked_sum(open.iter().map(|i| i.current_value))?;
        let profit_loss = ledger::profit_loss(current_value, total_invested)?;
        Ok(Self {
            user_id: user_id.to_string(),
            balance,
            total_invested,
            current_value,
            profit_loss,
            profit_loss_percent: ledger::profit_loss_percent(profit_loss, total_invested)?,
            active_investments: open.len(),
            pending_investments: investments
                .iter()
                .filter(|i| i.state == InvestmentState::Pending)
                .count(),
        })
    }
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>) -> Result<Decimal> {
    values.try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| Error::invalid_input("Portfolio total is out of range"))
    })
}
