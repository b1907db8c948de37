//! Withdrawal domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Error, Result, ValidationError};
use crate::ledger::Versioned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "PENDING",
            WithdrawalStatus::Completed => "COMPLETED",
            WithdrawalStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(WithdrawalStatus::Pending),
            "COMPLETED" => Some(WithdrawalStatus::Completed),
            "REJECTED" => Some(WithdrawalStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Where the money goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub routing_number: Option<String>,
    pub iban: Option<String>,
}

impl BankDetails {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("accountName", &self.account_name),
            ("accountNumber", &self.account_number),
            ("bankName", &self.bank_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    field.to_string(),
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub bank_details: BankDetails,
    pub status: WithdrawalStatus,
    /// The WITHDRAWAL transaction mirroring this request.
    pub transaction_id: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<NaiveDateTime>,
    pub admin_notes: Option<String>,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Withdrawal {
    pub fn new(
        user_id: &str,
        request: NewWithdrawal,
        transaction_id: &str,
        at: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount: request.amount,
            bank_details: request.bank_details,
            status: WithdrawalStatus::Pending,
            transaction_id: transaction_id.to_string(),
            processed_by: None,
            processed_at: None,
            admin_notes: None,
            version: 0,
            created_at: at,
            updated_at: at,
        }
    }

    /// Moves a pending withdrawal to `status`. Both outcomes are terminal.
    fn process(
        &mut self,
        status: WithdrawalStatus,
        admin_id: &str,
        notes: Option<String>,
        at: NaiveDateTime,
    ) -> Result<()> {
        if self.status != WithdrawalStatus::Pending {
            return Err(Error::InvalidState(format!(
                "withdrawal {} is already {}",
                self.id, self.status
            )));
        }
        self.status = status;
        self.processed_by = Some(admin_id.to_string());
        self.processed_at = Some(at);
        self.admin_notes = notes;
        self.updated_at = at;
        Ok(())
    }

    pub fn complete(&mut self, admin_id: &str, notes: Option<String>, at: NaiveDateTime) -> Result<()> {
        self.process(WithdrawalStatus::Completed, admin_id, notes, at)
    }

    pub fn reject(&mut self, admin_id: &str, notes: Option<String>, at: NaiveDateTime) -> Result<()> {
        self.process(WithdrawalStatus::Rejected, admin_id, notes, at)
    }
}

impl Versioned for Withdrawal {
    fn version(&self) -> i64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// Input model for a cash-out request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub amount: Decimal,
    pub bank_details: BankDetails,
}

impl NewWithdrawal {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::invalid_input("Withdrawal amount must be positive"));
        }
        self.bank_details.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn bank() -> BankDetails {
        BankDetails {
            account_name: "Jane Doe".to_string(),
            account_number: "0012345678".to_string(),
            bank_name: "First Bank".to_string(),
            routing_number: None,
            iban: None,
        }
    }

    #[test]
    fn test_processed_withdrawal_is_final() {
        let now = Utc::now().naive_utc();
        let mut wd = Withdrawal::new(
            "u1",
            NewWithdrawal {
                amount: dec!(50),
                bank_details: bank(),
            },
            "tx-1",
            now,
        );
        wd.complete("admin", Some("paid".to_string()), now).unwrap();
        assert_eq!(wd.status, WithdrawalStatus::Completed);
        assert!(wd.reject("admin", None, now).is_err());
        assert!(wd.complete("admin", None, now).is_err());
    }

    #[test]
    fn test_new_withdrawal_validation() {
        let mut request = NewWithdrawal {
            amount: dec!(0),
            bank_details: bank(),
        };
        assert!(request.validate().is_err());

        request.amount = dec!(10);
        request.bank_details.account_number = " ".to_string();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("accountNumber"));
    }
}
