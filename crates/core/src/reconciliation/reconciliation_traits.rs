use async_trait::async_trait;
use rust_decimal::Decimal;

use super::reconciliation_model::ReconciliationReport;
use crate::assets::Asset;
use crate::errors::Result;

#[async_trait]
pub trait ReconciliationServiceTrait: Send + Sync {
    /// Revalues every open investment in `asset` at its current price.
    ///
    /// Each investment is committed on its own; a failure on one is recorded
    /// in the report and the pass moves on. Callers must not run two passes
    /// over the same asset concurrently.
    async fn reconcile_asset(&self, asset: &Asset, old_price: Decimal)
        -> Result<ReconciliationReport>;

    /// Fails with a validation error if any open investment in `asset_id`
    /// cannot be valued at `price`.
    fn check_price(&self, asset_id: &str, price: Decimal) -> Result<()>;
}
