//! The sizing pipeline
//!
//! Sizes a prospective trade from a risk budget and a stop distance:
//!
//! ```text
//! base size = (equity x risk%) / |entry - stop|
//! ```
//!
//! then caps the result against the position ceiling and available balance,
//! applies the adjustment multipliers, and floors both sizes to instrument
//! precision. The steps are ordered deliberately: caps before multipliers,
//! multipliers before rounding. Multiplication does not commute with
//! clamping, and flooring last guarantees a rounded recommendation never
//! exceeds the envelope the earlier steps established.
//!
//! All arithmetic is decimal. Overflow on the hot path surfaces as
//! [`SizingError::CalculationOverflow`] instead of silently saturating.

use crate::errors::SizingError;
use crate::types::{AdjustmentFactors, PositionSizingResult, SizingInputs, TradeDirection};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, instrument};

const HUNDRED: Decimal = dec!(100);

/// Stateless sizing calculator.
#[derive(Debug, Clone, Default)]
pub struct SizingCalculator;

impl SizingCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Price at which the stop engages, on the loss side of the entry.
    pub fn stop_price(
        &self,
        direction: TradeDirection,
        entry_price: Decimal,
        stop_loss_percentage: Decimal,
    ) -> Decimal {
        let offset = entry_price * stop_loss_percentage / HUNDRED;
        match direction {
            TradeDirection::Long => entry_price - offset,
            TradeDirection::Short => entry_price + offset,
        }
    }

    /// Run the full pipeline for one trade.
    #[instrument(level = "debug", skip(self, inputs, factors),
        fields(symbol = %inputs.symbol, direction = %inputs.direction))]
    pub fn compute(
        &self,
        inputs: &SizingInputs,
        factors: AdjustmentFactors,
    ) -> Result<PositionSizingResult, SizingError> {
        if inputs.equity <= Decimal::ZERO {
            return Err(SizingError::invalid_equity(inputs.equity));
        }
        if inputs.entry_price <= Decimal::ZERO {
            return Err(SizingError::invalid_entry_price(inputs.entry_price));
        }
        if inputs.risk_percentage <= Decimal::ZERO {
            return Err(SizingError::invalid_risk_percentage(inputs.risk_percentage));
        }

        // Risk budget in quote units.
        let risk_amount = inputs
            .equity
            .checked_mul(inputs.risk_percentage)
            .map(|r| r / HUNDRED)
            .ok_or(SizingError::CalculationOverflow)?;

        let stop_price = self.stop_price(
            inputs.direction,
            inputs.entry_price,
            inputs.stop_loss_percentage,
        );
        let price_risk = (inputs.entry_price - stop_price).abs();
        if price_risk.is_zero() {
            return Err(SizingError::invalid_stop(inputs.entry_price, stop_price));
        }

        let mut base_size = risk_amount
            .checked_div(price_risk)
            .ok_or(SizingError::CalculationOverflow)?;
        let mut quote_size = base_size
            .checked_mul(inputs.entry_price)
            .ok_or(SizingError::CalculationOverflow)?;

        // Cap 1: position ceiling as a share of equity.
        let max_allowed_quote = inputs.equity * inputs.max_position_percentage / HUNDRED;
        if quote_size > max_allowed_quote {
            quote_size = max_allowed_quote;
            base_size = quote_size / inputs.entry_price;
        }

        // Cap 2: whatever quote balance is actually free.
        if quote_size > inputs.available_quote {
            quote_size = inputs.available_quote;
            base_size = quote_size / inputs.entry_price;
        }

        let combined = factors.product();
        base_size = base_size
            .checked_mul(combined)
            .ok_or(SizingError::CalculationOverflow)?;
        quote_size = quote_size
            .checked_mul(combined)
            .ok_or(SizingError::CalculationOverflow)?;

        // Truncate toward zero so rounding can only shrink the risk taken.
        base_size =
            base_size.round_dp_with_strategy(inputs.base_precision, RoundingStrategy::ToZero);
        quote_size =
            quote_size.round_dp_with_strategy(inputs.quote_precision, RoundingStrategy::ToZero);

        let max_loss_amount = base_size * price_risk;
        let effective_risk_percentage = max_loss_amount / inputs.equity * HUNDRED;
        let leverage = if max_allowed_quote.is_zero() {
            Decimal::ZERO
        } else {
            (quote_size / max_allowed_quote).min(inputs.max_leverage)
        };

        debug!(
            risk_amount = %risk_amount,
            price_risk = %price_risk,
            base_size = %base_size,
            quote_size = %quote_size,
            combined_factor = %combined,
            "sizing pipeline completed"
        );

        Ok(PositionSizingResult {
            symbol: inputs.symbol.clone(),
            base_size,
            quote_size,
            effective_risk_percentage,
            stop_loss_price: stop_price,
            max_loss_amount,
            leverage,
            adjustment_factors: factors,
        })
    }
}
