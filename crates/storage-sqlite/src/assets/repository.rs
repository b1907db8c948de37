use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::info;
use std::sync::Arc;

use vaultfolio_core::assets::{Asset, AssetRepositoryTrait};
use vaultfolio_core::errors::{Error, Result, ValidationError};
use vaultfolio_core::investments::InvestmentState;

use super::model::AssetDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{assets, investments};

pub struct AssetRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

fn load_asset(conn: &mut SqliteConnection, asset_id: &str) -> Result<Asset> {
    let row = assets::table
        .find(asset_id)
        .select(AssetDB::as_select())
        .first::<AssetDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found("Asset", asset_id))?;
    Ok(Asset::try_from(row)?)
}

/// States that still tie an investment to its asset.
fn live_states() -> Vec<&'static str> {
    InvestmentState::ALL
        .iter()
        .filter(|s| !s.is_terminal())
        .map(|s| s.as_db_str())
        .collect()
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    async fn create(&self, asset: Asset) -> Result<Asset> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let taken = assets::table
                    .filter(assets::symbol.eq(&asset.symbol))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if taken > 0 {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "An asset with symbol {} already exists",
                        asset.symbol
                    ))));
                }
                diesel::insert_into(assets::table)
                    .values(AssetDB::try_from(&asset)?)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(asset)
            })
            .await
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;
        load_asset(&mut conn, asset_id)
    }

    fn get_by_symbol(&self, symbol: &str) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let row = assets::table
            .filter(assets::symbol.eq(symbol))
            .select(AssetDB::as_select())
            .first::<AssetDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Asset::try_from).transpose()?)
    }

    fn list(&self, is_active: Option<bool>) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = assets::table.select(AssetDB::as_select()).into_boxed();
        if let Some(active) = is_active {
            query = query.filter(assets::is_active.eq(active));
        }
        let rows = query
            .order(assets::symbol.asc())
            .load::<AssetDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(Asset::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn deactivate(&self, asset_id: &str) -> Result<Asset> {
        let asset_id = asset_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let mut asset = load_asset(conn, &asset_id)?;

                let open = investments::table
                    .filter(investments::asset_id.eq(&asset_id))
                    .filter(investments::state.eq_any(live_states()))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if open > 0 {
                    return Err(Error::InvalidState(format!(
                        "asset {} still has {} open investments",
                        asset_id, open
                    )));
                }

                asset.is_active = false;
                asset.version += 1;
                asset.updated_at = Utc::now().naive_utc();
                diesel::update(assets::table.find(&asset_id))
                    .set((
                        assets::is_active.eq(false),
                        assets::version.eq(asset.version),
                        assets::updated_at.eq(asset.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                info!("Asset {} deactivated", asset_id);
                Ok(asset)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDb;
    use rust_decimal_macros::dec;
    use vaultfolio_core::assets::{AssetType, PricePoint};

    fn asset(id: &str, symbol: &str) -> Asset {
        let now = Utc::now().naive_utc();
        Asset {
            id: id.to_string(),
            name: id.to_string(),
            symbol: symbol.to_string(),
            asset_type: AssetType::Silver,
            current_price: dec!(25.40),
            min_investment: dec!(50),
            price_history: vec![PricePoint {
                timestamp: now,
                price: dec!(25.40),
            }],
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_keeps_symbols_unique_and_lists_by_symbol() {
        let db = TestDb::new();
        let repo = AssetRepository::new(Arc::clone(&db.pool), db.writer.clone());

        repo.create(asset("silver", "XAG")).await.unwrap();
        repo.create(asset("btc", "BTC")).await.unwrap();
        let err = repo.create(asset("silver-2", "XAG")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let symbols: Vec<_> = repo
            .list(None)
            .unwrap()
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["BTC", "XAG"]);

        let silver = repo.get_by_symbol("XAG").unwrap().unwrap();
        assert_eq!(silver.current_price, dec!(25.40));
        assert_eq!(silver.price_history.len(), 1);
        assert_eq!(silver.price_history[0].price, dec!(25.40));
    }

    #[tokio::test]
    async fn test_deactivate_bumps_version_and_filters_listing() {
        let db = TestDb::new();
        let repo = AssetRepository::new(Arc::clone(&db.pool), db.writer.clone());
        repo.create(asset("silver", "XAG")).await.unwrap();

        let deactivated = repo.deactivate("silver").await.unwrap();
        assert!(!deactivated.is_active);
        assert_eq!(deactivated.version, 1);
        assert!(repo.list(Some(true)).unwrap().is_empty());
        assert_eq!(repo.get_by_id("silver").unwrap().version, 1);
        assert!(matches!(
            repo.deactivate("missing").await,
            Err(Error::NotFound(_))
        ));
    }
}
