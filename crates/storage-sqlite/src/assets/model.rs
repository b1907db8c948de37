//! Database model for assets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use vaultfolio_core::assets::{Asset, AssetType, PricePoint};

use crate::errors::StorageError;
use crate::utils::{parse_db_enum, parse_decimal};

/// Database model for assets. `price_history` is a JSON array of points,
/// oldest first.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub asset_type: String,
    pub current_price: String,
    pub min_investment: String,
    pub price_history: String,
    pub is_active: bool,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AssetDB> for Asset {
    type Error = StorageError;

    fn try_from(db: AssetDB) -> Result<Self, Self::Error> {
        let price_history: Vec<PricePoint> = serde_json::from_str(&db.price_history)?;
        Ok(Self {
            asset_type: parse_db_enum(&db.asset_type, "asset_type", AssetType::from_db_str)?,
            current_price: parse_decimal(&db.current_price, "assets.current_price")?,
            min_investment: parse_decimal(&db.min_investment, "assets.min_investment")?,
            price_history,
            id: db.id,
            name: db.name,
            symbol: db.symbol,
            is_active: db.is_active,
            version: db.version,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<&Asset> for AssetDB {
    type Error = StorageError;

    fn try_from(asset: &Asset) -> Result<Self, Self::Error> {
        Ok(Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
            symbol: asset.symbol.clone(),
            asset_type: asset.asset_type.as_db_str().to_string(),
            current_price: asset.current_price.to_string(),
            min_investment: asset.min_investment.to_string(),
            price_history: serde_json::to_string(&asset.price_history)?,
            is_active: asset.is_active,
            version: asset.version,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        })
    }
}
