//! Platform tunables handed to the core by the host application.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PRICE_HISTORY_LIMIT;

/// How withdrawal requests are checked against the balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPolicy {
    /// When set, a request must fit in the balance minus all pending
    /// withdrawals of the same user, not just the balance.
    pub reserve_on_request: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    /// Recipient of admin-facing notifications. None disables them.
    pub admin_email: Option<String>,
    pub withdrawal_policy: WithdrawalPolicy,
    pub price_history_limit: usize,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            admin_email: None,
            withdrawal_policy: WithdrawalPolicy::default(),
            price_history_limit: DEFAULT_PRICE_HISTORY_LIMIT,
        }
    }
}
