use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::info;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::assets_model::{Asset, AssetUpdate, NewAsset, PricePoint, PriceUpdate};
use super::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
use crate::auth::Principal;
use crate::errors::{Error, Result};
use crate::ledger::{retry_on_conflict, EntityWrite, LedgerCommit, LedgerStoreTrait};
use crate::reconciliation::ReconciliationServiceTrait;
use crate::settings::PlatformSettings;

/// Service for managing assets and their prices.
pub struct AssetService {
    repository: Arc<dyn AssetRepositoryTrait>,
    ledger_store: Arc<dyn LedgerStoreTrait>,
    reconciliation_service: Arc<dyn ReconciliationServiceTrait>,
    settings: PlatformSettings,
    /// One lock per asset so price updates and their passes never interleave.
    price_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AssetService {
    pub fn new(
        repository: Arc<dyn AssetRepositoryTrait>,
        ledger_store: Arc<dyn LedgerStoreTrait>,
        reconciliation_service: Arc<dyn ReconciliationServiceTrait>,
        settings: PlatformSettings,
    ) -> Self {
        Self {
            repository,
            ledger_store,
            reconciliation_service,
            settings,
            price_locks: DashMap::new(),
        }
    }

    fn price_lock(&self, asset_id: &str) -> Arc<Mutex<()>> {
        self.price_locks
            .entry(asset_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl AssetServiceTrait for AssetService {
    async fn create_asset(&self, principal: &Principal, new_asset: NewAsset) -> Result<Asset> {
        principal.require_admin()?;
        new_asset.validate()?;

        let symbol = new_asset.symbol.trim().to_uppercase();
        if self.repository.get_by_symbol(&symbol)?.is_some() {
            return Err(Error::invalid_input(format!(
                "An asset with symbol {} already exists",
                symbol
            )));
        }

        let now = Utc::now().naive_utc();
        let asset = Asset {
            id: new_asset
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: new_asset.name.trim().to_string(),
            symbol,
            asset_type: new_asset.asset_type,
            current_price: new_asset.current_price,
            min_investment: new_asset.min_investment,
            price_history: vec![PricePoint {
                timestamp: now,
                price: new_asset.current_price,
            }],
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let asset = self.repository.create(asset).await?;
        info!(
            "Created asset {} ({}) at {}",
            asset.symbol,
            asset.asset_type.as_db_str(),
            asset.current_price
        );
        Ok(asset)
    }

    async fn update_asset(
        &self,
        principal: &Principal,
        asset_id: &str,
        update: AssetUpdate,
    ) -> Result<Asset> {
        principal.require_admin()?;
        update.validate()?;
        let update = &update;

        retry_on_conflict("update_asset", || async move {
            let mut asset = self.repository.get_by_id(asset_id)?;
            if let Some(name) = &update.name {
                asset.name = name.trim().to_string();
            }
            if let Some(asset_type) = update.asset_type {
                asset.asset_type = asset_type;
            }
            if let Some(min_investment) = update.min_investment {
                asset.min_investment = min_investment;
            }
            asset.updated_at = Utc::now().naive_utc();

            let write = EntityWrite::update(asset);
            let updated = write.record().clone();
            self.ledger_store
                .commit(LedgerCommit::new().with_asset(write))
                .await?;
            Ok(updated)
        })
        .await
    }

    async fn update_price(
        &self,
        principal: &Principal,
        asset_id: &str,
        price: Decimal,
    ) -> Result<PriceUpdate> {
        principal.require_admin()?;
        if price <= Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "Asset price must be positive, got {}",
                price
            )));
        }

        let lock = self.price_lock(asset_id);
        let _guard = lock.lock().await;
        self.reconciliation_service.check_price(asset_id, price)?;
        let history_limit = self.settings.price_history_limit;

        let (asset, old_price) = retry_on_conflict("update_price", || async move {
            let mut asset = self.repository.get_by_id(asset_id)?;
            if !asset.is_active {
                return Err(Error::InvalidState(format!(
                    "asset {} is inactive",
                    asset.symbol
                )));
            }
            let old_price = asset.current_price;
            asset.apply_price(price, Utc::now().naive_utc(), history_limit);

            let write = EntityWrite::update(asset);
            let updated = write.record().clone();
            self.ledger_store
                .commit(LedgerCommit::new().with_asset(write))
                .await?;
            Ok((updated, old_price))
        })
        .await?;

        info!(
            "Price of {} changed from {} to {} by {}",
            asset.symbol, old_price, price, principal.user_id
        );
        let reconciliation = self
            .reconciliation_service
            .reconcile_asset(&asset, old_price)
            .await?;
        Ok(PriceUpdate {
            asset,
            reconciliation,
        })
    }

    async fn deactivate_asset(&self, principal: &Principal, asset_id: &str) -> Result<Asset> {
        principal.require_admin()?;
        let lock = self.price_lock(asset_id);
        let _guard = lock.lock().await;
        let asset = self.repository.deactivate(asset_id).await?;
        info!("Deactivated asset {}", asset.symbol);
        Ok(asset)
    }

    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        self.repository.get_by_id(asset_id)
    }

    fn list_assets(&self, is_active: Option<bool>) -> Result<Vec<Asset>> {
        self.repository.list(is_active)
    }
}
