//! Asset repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::assets_model::{Asset, AssetUpdate, NewAsset, PriceUpdate};
use crate::auth::Principal;
use crate::errors::Result;

/// Persistence contract for assets.
///
/// Field and price updates are ledger commits; this trait covers what
/// cannot be expressed as one.
#[async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// Inserts a new asset. Fails with a validation error if the symbol is taken.
    async fn create(&self, asset: Asset) -> Result<Asset>;

    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;

    fn get_by_symbol(&self, symbol: &str) -> Result<Option<Asset>>;

    /// Ordered by symbol.
    fn list(&self, is_active: Option<bool>) -> Result<Vec<Asset>>;

    /// Soft-deletes the asset, failing with `InvalidState` if any pending or
    /// open investment references it. The check and the write are atomic.
    async fn deactivate(&self, asset_id: &str) -> Result<Asset>;
}

#[async_trait]
pub trait AssetServiceTrait: Send + Sync {
    async fn create_asset(&self, principal: &Principal, new_asset: NewAsset) -> Result<Asset>;

    async fn update_asset(
        &self,
        principal: &Principal,
        asset_id: &str,
        update: AssetUpdate,
    ) -> Result<Asset>;

    /// Sets a new price and runs the reconciliation pass it triggers.
    async fn update_price(
        &self,
        principal: &Principal,
        asset_id: &str,
        price: Decimal,
    ) -> Result<PriceUpdate>;

    async fn deactivate_asset(&self, principal: &Principal, asset_id: &str) -> Result<Asset>;

    fn get_asset(&self, asset_id: &str) -> Result<Asset>;

    fn list_assets(&self, is_active: Option<bool>) -> Result<Vec<Asset>>;
}
