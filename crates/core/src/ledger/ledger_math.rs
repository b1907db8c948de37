//! Pure valuation primitives shared by every money-moving workflow.
//!
//! Quantities keep full decimal precision; monetary results are rounded to
//! [`DECIMAL_PRECISION`] places so that stored values compare exactly.

use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result};

/// Units of an asset bought with `amount` at `purchase_price`.
pub fn quantity(amount: Decimal, purchase_price: Decimal) -> Result<Decimal> {
    if purchase_price <= Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "Purchase price must be positive, got {}",
            purchase_price
        )));
    }
    amount
        .checked_div(purchase_price)
        .ok_or_else(|| Error::invalid_input("Quantity calculation overflowed"))
}

/// Mark-to-market value of `quantity` units at `current_price`.
pub fn current_value(quantity: Decimal, current_price: Decimal) -> Result<Decimal> {
    quantity
        .checked_mul(current_price)
        .map(|value| value.round_dp(DECIMAL_PRECISION))
        .ok_or_else(|| {
            Error::invalid_input(format!(
                "Value of {} units at {} is out of range",
                quantity, current_price
            ))
        })
}

pub fn profit_loss(current_value: Decimal, amount: Decimal) -> Result<Decimal> {
    current_value
        .checked_sub(amount)
        .ok_or_else(|| Error::invalid_input("Profit/loss calculation overflowed"))
}

/// Profit/loss as a percentage of the committed amount. Zero when nothing was committed.
pub fn profit_loss_percent(profit_loss: Decimal, amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    profit_loss
        .checked_div(amount)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| percent.round_dp(DECIMAL_PRECISION))
        .ok_or_else(|| Error::invalid_input("Profit/loss percentage overflowed"))
}

/// Valuation of a holding at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Valuation {
    pub current_value: Decimal,
    pub profit_loss: Decimal,
}

/// Values `quantity` units bought for `amount` at `price`.
pub fn value_at(quantity: Decimal, amount: Decimal, price: Decimal) -> Result<Valuation> {
    let current_value = current_value(quantity, price)?;
    Ok(Valuation {
        current_value,
        profit_loss: profit_loss(current_value, amount)?,
    })
}
