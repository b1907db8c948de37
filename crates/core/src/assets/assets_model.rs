//! Asset domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::ledger::Versioned;
use crate::reconciliation::ReconciliationReport;

/// Instrument category of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Gold,
    Silver,
    Crypto,
    Stocks,
    RealEstate,
    Bonds,
}

impl AssetType {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AssetType::Gold => "GOLD",
            AssetType::Silver => "SILVER",
            AssetType::Crypto => "CRYPTO",
            AssetType::Stocks => "STOCKS",
            AssetType::RealEstate => "REAL_ESTATE",
            AssetType::Bonds => "BONDS",
        }
    }

    /// Parses an asset type from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "GOLD" => Some(AssetType::Gold),
            "SILVER" => Some(AssetType::Silver),
            "CRYPTO" => Some(AssetType::Crypto),
            "STOCKS" => Some(AssetType::Stocks),
            "REAL_ESTATE" => Some(AssetType::RealEstate),
            "BONDS" => Some(AssetType::Bonds),
            _ => None,
        }
    }
}

/// One recorded price of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: Decimal,
}

/// Domain model representing a tradeable asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub asset_type: AssetType,
    pub current_price: Decimal,
    pub min_investment: Decimal,
    /// Oldest first, bounded by the configured history limit.
    pub price_history: Vec<PricePoint>,
    pub is_active: bool,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Asset {
    /// Sets a new current price and appends it to the history, dropping the
    /// oldest points beyond `history_limit`.
    pub fn apply_price(&mut self, price: Decimal, at: NaiveDateTime, history_limit: usize) {
        self.current_price = price;
        self.updated_at = at;
        self.price_history.push(PricePoint {
            timestamp: at,
            price,
        });
        if self.price_history.len() > history_limit {
            let excess = self.price_history.len() - history_limit;
            self.price_history.drain(..excess);
        }
    }
}

impl Versioned for Asset {
    fn version(&self) -> i64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// Input model for creating an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub symbol: String,
    pub asset_type: AssetType,
    pub current_price: Decimal,
    #[serde(default)]
    pub min_investment: Decimal,
}

impl NewAsset {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "symbol".to_string(),
            )));
        }
        if self.current_price <= Decimal::ZERO {
            return Err(Error::invalid_input("Asset price must be positive"));
        }
        if self.min_investment < Decimal::ZERO {
            return Err(Error::invalid_input("Minimum investment cannot be negative"));
        }
        Ok(())
    }
}

/// Input model for updating the descriptive fields of an asset.
///
/// Price changes go through the price update flow instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub asset_type: Option<AssetType>,
    pub min_investment: Option<Decimal>,
}

impl AssetUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::invalid_input("Asset name cannot be empty"));
            }
        }
        if let Some(min) = self.min_investment {
            if min < Decimal::ZERO {
                return Err(Error::invalid_input("Minimum investment cannot be negative"));
            }
        }
        Ok(())
    }
}

/// Result of an admin price update: the updated asset and the reconciliation
/// pass it triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub asset: Asset,
    pub reconciliation: ReconciliationReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    fn gold() -> Asset {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Asset {
            id: "gold".to_string(),
            name: "Gold".to_string(),
            symbol: "XAU".to_string(),
            asset_type: AssetType::Gold,
            current_price: dec!(2000),
            min_investment: dec!(100),
            price_history: vec![PricePoint {
                timestamp: at,
                price: dec!(2000),
            }],
            is_active: true,
            version: 0,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_apply_price_appends_history() {
        let mut asset = gold();
        let at = asset.created_at + Duration::hours(1);
        asset.apply_price(dec!(2200), at, 100);

        assert_eq!(asset.current_price, dec!(2200));
        assert_eq!(asset.price_history.len(), 2);
        assert_eq!(asset.price_history.last().unwrap().price, dec!(2200));
    }

    #[test]
    fn test_apply_price_keeps_newest_points() {
        let mut asset = gold();
        for i in 1..=150 {
            let at = asset.created_at + Duration::minutes(i);
            asset.apply_price(Decimal::from(2000 + i), at, 100);
        }

        assert_eq!(asset.price_history.len(), 100);
        assert_eq!(asset.price_history.first().unwrap().price, dec!(2051));
        assert_eq!(asset.price_history.last().unwrap().price, dec!(2150));
    }

    #[test]
    fn test_new_asset_requires_positive_price() {
        let new_asset = NewAsset {
            id: None,
            name: "Silver".to_string(),
            symbol: "XAG".to_string(),
            asset_type: AssetType::Silver,
            current_price: Decimal::ZERO,
            min_investment: dec!(10),
        };
        assert!(new_asset.validate().is_err());
    }

    #[test]
    fn test_asset_type_db_strings() {
        for t in [
            AssetType::Gold,
            AssetType::Silver,
            AssetType::Crypto,
            AssetType::Stocks,
            AssetType::RealEstate,
            AssetType::Bonds,
        ] {
            assert_eq!(AssetType::from_db_str(t.as_db_str()), Some(t));
        }
    }
}
