//! Error types for position sizing calculations

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while computing a size recommendation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SizingError {
    /// Account equity is zero or negative
    #[error("invalid account equity: {value}. Equity must be positive")]
    InvalidEquity { value: Decimal },

    /// Entry price is zero or negative
    #[error("invalid entry price: {value}. Price must be positive")]
    InvalidEntryPrice { value: Decimal },

    /// Risk percentage is zero or negative
    #[error("invalid risk percentage: {value}. Risk must be positive")]
    InvalidRiskPercentage { value: Decimal },

    /// Stop distance collapsed to zero, so risk per unit is undefined
    #[error("invalid stop: entry={entry}, stop={stop}. Stop price must differ from entry")]
    InvalidStop { entry: Decimal, stop: Decimal },

    /// Arithmetic exceeded decimal precision
    #[error("calculation overflow: sizing arithmetic exceeded decimal precision")]
    CalculationOverflow,
}

impl SizingError {
    pub fn invalid_equity(value: Decimal) -> Self {
        Self::InvalidEquity { value }
    }

    pub fn invalid_entry_price(value: Decimal) -> Self {
        Self::InvalidEntryPrice { value }
    }

    pub fn invalid_risk_percentage(value: Decimal) -> Self {
        Self::InvalidRiskPercentage { value }
    }

    pub fn invalid_stop(entry: Decimal, stop: Decimal) -> Self {
        Self::InvalidStop { entry, stop }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_formatting() {
        let err = SizingError::invalid_equity(dec!(-100));
        assert_eq!(
            err.to_string(),
            "invalid account equity: -100. Equity must be positive"
        );

        let err = SizingError::invalid_stop(dec!(100), dec!(100));
        assert_eq!(
            err.to_string(),
            "invalid stop: entry=100, stop=100. Stop price must differ from entry"
        );
    }

    #[test]
    fn error_equality() {
        assert_eq!(
            SizingError::invalid_entry_price(Decimal::ZERO),
            SizingError::invalid_entry_price(Decimal::ZERO)
        );
        assert_ne!(
            SizingError::CalculationOverflow,
            SizingError::invalid_risk_percentage(Decimal::ZERO)
        );
    }
}
