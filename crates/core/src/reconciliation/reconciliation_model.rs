use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An investment the pass could not revalue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationFailure {
    pub investment_id: String,
    pub error: String,
}

/// Outcome of one reconciliation pass over an asset.
///
/// `total_delta` always equals the sum of `user_deltas`, and both only count
/// commits that succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub asset_id: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub investments_updated: usize,
    pub investments_unchanged: usize,
    /// Investments that stopped being open while the pass ran.
    pub skipped: Vec<String>,
    pub failed: Vec<ReconciliationFailure>,
    pub total_delta: Decimal,
    pub user_deltas: BTreeMap<String, Decimal>,
}

impl ReconciliationReport {
    pub fn new(asset_id: &str, old_price: Decimal, new_price: Decimal) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            old_price,
            new_price,
            investments_updated: 0,
            investments_unchanged: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
            total_delta: Decimal::ZERO,
            user_deltas: BTreeMap::new(),
        }
    }

    pub(crate) fn record_update(&mut self, user_id: &str, delta: Decimal) {
        self.investments_updated += 1;
        self.total_delta += delta;
        *self
            .user_deltas
            .entry(user_id.to_string())
            .or_insert(Decimal::ZERO) += delta;
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_user_deltas_accumulate() {
        let mut report = ReconciliationReport::new("gold", dec!(2000), dec!(2200));
        report.record_update("u1", dec!(100));
        report.record_update("u2", dec!(50));
        report.record_update("u1", dec!(20));

        assert_eq!(report.investments_updated, 3);
        assert_eq!(report.total_delta, dec!(170));
        assert_eq!(report.user_deltas["u1"], dec!(120));
        assert_eq!(
            report.user_deltas.values().copied().sum::<Decimal>(),
            report.total_delta
        );
    }
}
