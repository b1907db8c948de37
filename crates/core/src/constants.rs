/// Number of price points kept on an asset by default
pub const DEFAULT_PRICE_HISTORY_LIMIT: usize = 100;

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 8;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Maximum attempts for a write guarded by an optimistic version check
pub const MAX_CAS_ATTEMPTS: usize = 3;
