//! Mensura - Adaptive Position Sizing
//!
//! Decimal-precise sizing of prospective trades from a per-trade risk
//! budget and a stop-loss distance, shaped by market classifiers:
//!
//! - **Pipeline** ([`SizingCalculator`]): risk budget, stop price, raw
//!   size, position and balance caps, adjustment multipliers, truncating
//!   precision rounding, derived risk figures.
//! - **Classifiers** ([`VolatilityClass`], [`MarketCapClass`],
//!   [`TradingSession`]): map raw market measurements onto the closed
//!   classes the configuration assigns multipliers to.
//! - **Configuration** ([`SizerConfig`], [`SizerConfigHandle`]): immutable
//!   snapshots behind a hot-swappable handle, so reloads never tear a
//!   computation in flight.
//!
//! The crate is deliberately pure: no I/O, no clocks, no service calls.
//! Callers resolve every input first, which keeps the arithmetic trivially
//! testable and the risk envelope provable.

pub mod calculator;
pub mod classifiers;
pub mod config;
pub mod errors;
pub mod types;

pub use calculator::SizingCalculator;
pub use classifiers::{MarketCapClass, TradingSession, VolatilityClass};
pub use config::{
    ConcentrationTier, MarketCapMultipliers, SizerConfig, SizerConfigHandle, TimeOfDayAdjustment,
    VolatilityMultipliers,
};
pub use errors::SizingError;
pub use types::{AdjustmentFactors, PositionSizingResult, SizingInputs, TradeDirection};

/// Result type for sizing operations.
pub type Result<T> = std::result::Result<T, SizingError>;
