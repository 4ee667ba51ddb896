//! Input and output types for the sizing pipeline

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of the prospective trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "LONG"),
            TradeDirection::Short => write!(f, "SHORT"),
        }
    }
}

/// Fully resolved inputs to one sizing computation.
///
/// Percentage fields are whole-number percent. Defaults and service lookups
/// happen upstream; by the time a value lands here it is concrete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingInputs {
    pub symbol: String,
    pub direction: TradeDirection,
    pub equity: Decimal,
    pub entry_price: Decimal,
    pub stop_loss_percentage: Decimal,
    pub risk_percentage: Decimal,
    pub max_position_percentage: Decimal,
    /// Free quote-currency balance available to fund the position.
    pub available_quote: Decimal,
    /// Ceiling reported for the leverage output.
    pub max_leverage: Decimal,
    pub base_precision: u32,
    pub quote_precision: u32,
}

/// The scalar multipliers applied to a raw size, recorded for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFactors {
    pub volatility: Decimal,
    pub market_cap: Decimal,
    pub confidence: Decimal,
    pub concentration: Decimal,
    pub time_of_day: Decimal,
}

impl AdjustmentFactors {
    /// Neutral factors that leave the size untouched.
    pub fn unit() -> Self {
        Self {
            volatility: Decimal::ONE,
            market_cap: Decimal::ONE,
            confidence: Decimal::ONE,
            concentration: Decimal::ONE,
            time_of_day: Decimal::ONE,
        }
    }

    /// Combined multiplier.
    pub fn product(&self) -> Decimal {
        self.volatility * self.market_cap * self.confidence * self.concentration * self.time_of_day
    }
}

impl Default for AdjustmentFactors {
    fn default() -> Self {
        Self::unit()
    }
}

/// A size recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizingResult {
    pub symbol: String,
    /// Recommended quantity in base units, floored to instrument precision.
    pub base_size: Decimal,
    /// Quote-currency value of the recommendation, floored likewise.
    pub quote_size: Decimal,
    /// Risk actually taken after caps, adjustments, and rounding, as a
    /// percentage of equity.
    pub effective_risk_percentage: Decimal,
    pub stop_loss_price: Decimal,
    /// Loss incurred if the stop is hit at exactly the stop price.
    pub max_loss_amount: Decimal,
    pub leverage: Decimal,
    pub adjustment_factors: AdjustmentFactors,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unit_factors_multiply_to_one() {
        assert_eq!(AdjustmentFactors::unit().product(), Decimal::ONE);
        assert_eq!(AdjustmentFactors::default().product(), Decimal::ONE);
    }

    #[test]
    fn factor_product() {
        let factors = AdjustmentFactors {
            volatility: dec!(0.7),
            market_cap: dec!(1.0),
            confidence: dec!(0.5),
            concentration: dec!(0.4),
            time_of_day: dec!(0.9),
        };
        assert_eq!(factors.product(), dec!(0.126));
    }

    #[test]
    fn direction_display() {
        assert_eq!(TradeDirection::Long.to_string(), "LONG");
        assert_eq!(TradeDirection::Short.to_string(), "SHORT");
    }
}
