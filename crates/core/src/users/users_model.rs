//! User domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::errors::{Error, Result, ValidationError};

/// A platform user as seen by the core.
///
/// `balance` is withdrawable cash plus unrealized gains credited by price
/// reconciliation. It is only ever changed through a ledger commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub balance: Decimal,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for seeding a user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::invalid_input(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}
