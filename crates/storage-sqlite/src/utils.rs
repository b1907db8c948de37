//! Column conversion helpers shared by the database models.
//!
//! Monetary values live in TEXT columns. Parsing is strict: a value that does
//! not parse is a corrupt row, never a zero.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;

pub fn parse_decimal(value: &str, field: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value).map_err(|e| {
        log::error!("Failed to parse {} '{}' as a decimal: {}", field, value, e);
        StorageError::SerializationError(format!("invalid decimal in {}: {}", field, value))
    })
}

/// Parses a db string through one of the core `from_db_str` constructors.
pub fn parse_db_enum<T>(
    value: &str,
    field: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, StorageError> {
    parse(value).ok_or_else(|| {
        StorageError::SerializationError(format!("unknown {} '{}'", field, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use vaultfolio_core::investments::InvestmentState;

    #[test]
    fn test_parse_decimal_is_exact() {
        assert_eq!(parse_decimal("1200.01", "balance").unwrap(), dec!(1200.01));
        assert_eq!(parse_decimal("-0.5", "delta").unwrap(), dec!(-0.5));
        assert!(parse_decimal("12,00", "balance").is_err());
        assert!(parse_decimal("", "balance").is_err());
    }

    #[test]
    fn test_parse_db_enum() {
        assert_eq!(
            parse_db_enum("CLOSURE_REQUESTED", "state", InvestmentState::from_db_str).unwrap(),
            InvestmentState::ClosureRequested
        );
        assert!(parse_db_enum("OPEN", "state", InvestmentState::from_db_str).is_err());
    }
}
