//! Market classifiers feeding the sizing adjustments
//!
//! Each classifier maps a raw market measurement onto a small closed enum.
//! The sizer configuration assigns a multiplier to every class, so the
//! classes themselves stay free of any tuning values beyond their band
//! boundaries.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Volatility band of an instrument, from 30-day historical sigma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityClass {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    Extreme,
}

impl VolatilityClass {
    /// Classify a historical volatility reading (sigma of daily returns).
    pub fn classify(sigma: Decimal) -> Self {
        if sigma < dec!(0.01) {
            VolatilityClass::VeryLow
        } else if sigma < dec!(0.02) {
            VolatilityClass::Low
        } else if sigma < dec!(0.03) {
            VolatilityClass::Medium
        } else if sigma < dec!(0.05) {
            VolatilityClass::High
        } else if sigma < dec!(0.08) {
            VolatilityClass::VeryHigh
        } else {
            VolatilityClass::Extreme
        }
    }
}

impl std::fmt::Display for VolatilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VolatilityClass::VeryLow => "VERY_LOW",
            VolatilityClass::Low => "LOW",
            VolatilityClass::Medium => "MEDIUM",
            VolatilityClass::High => "HIGH",
            VolatilityClass::VeryHigh => "VERY_HIGH",
            VolatilityClass::Extreme => "EXTREME",
        };
        write!(f, "{}", name)
    }
}

/// Capitalization tier of an instrument's base asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapClass {
    Mega,
    Large,
    Mid,
    Small,
    Micro,
    Nano,
}

impl MarketCapClass {
    /// Classify a market capitalization expressed in quote units.
    pub fn classify(market_cap: Decimal) -> Self {
        if market_cap > dec!(200_000_000_000) {
            MarketCapClass::Mega
        } else if market_cap > dec!(10_000_000_000) {
            MarketCapClass::Large
        } else if market_cap > dec!(2_000_000_000) {
            MarketCapClass::Mid
        } else if market_cap > dec!(300_000_000) {
            MarketCapClass::Small
        } else if market_cap > dec!(50_000_000) {
            MarketCapClass::Micro
        } else {
            MarketCapClass::Nano
        }
    }
}

impl std::fmt::Display for MarketCapClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MarketCapClass::Mega => "MEGA",
            MarketCapClass::Large => "LARGE",
            MarketCapClass::Mid => "MID",
            MarketCapClass::Small => "SMALL",
            MarketCapClass::Micro => "MICRO",
            MarketCapClass::Nano => "NANO",
        };
        write!(f, "{}", name)
    }
}

/// Session window of the trading day, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingSession {
    /// Weekday 08:00-16:00 UTC
    Peak,
    /// Weekday outside peak hours
    OffHours,
    /// Saturday or Sunday
    Weekend,
}

impl TradingSession {
    /// Classify an instant in time.
    pub fn classify(at: DateTime<Utc>) -> Self {
        match at.weekday() {
            Weekday::Sat | Weekday::Sun => TradingSession::Weekend,
            _ if (8..16).contains(&at.hour()) => TradingSession::Peak,
            _ => TradingSession::OffHours,
        }
    }
}

impl std::fmt::Display for TradingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TradingSession::Peak => "PEAK",
            TradingSession::OffHours => "OFF_HOURS",
            TradingSession::Weekend => "WEEKEND",
        };
        write!(f, "{}", name)
    }
}
