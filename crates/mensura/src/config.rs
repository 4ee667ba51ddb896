//! Sizer configuration and its hot-swappable handle
//!
//! The sizing pipeline never reads configuration from globals. Callers load
//! an immutable snapshot from a [`SizerConfigHandle`], so a reload that
//! lands mid-computation can never produce a torn view.

use crate::classifiers::{MarketCapClass, TradingSession, VolatilityClass};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Multiplier applied per volatility class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityMultipliers {
    pub very_low: Decimal,
    pub low: Decimal,
    pub medium: Decimal,
    pub high: Decimal,
    pub very_high: Decimal,
    pub extreme: Decimal,
}

impl VolatilityMultipliers {
    pub fn for_class(&self, class: VolatilityClass) -> Decimal {
        match class {
            VolatilityClass::VeryLow => self.very_low,
            VolatilityClass::Low => self.low,
            VolatilityClass::Medium => self.medium,
            VolatilityClass::High => self.high,
            VolatilityClass::VeryHigh => self.very_high,
            VolatilityClass::Extreme => self.extreme,
        }
    }
}

impl Default for VolatilityMultipliers {
    fn default() -> Self {
        Self {
            very_low: dec!(1.2),
            low: dec!(1.1),
            medium: dec!(1.0),
            high: dec!(0.7),
            very_high: dec!(0.5),
            extreme: dec!(0.3),
        }
    }
}

/// Multiplier applied per market-capitalization tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketCapMultipliers {
    pub mega: Decimal,
    pub large: Decimal,
    pub mid: Decimal,
    pub small: Decimal,
    pub micro: Decimal,
    pub nano: Decimal,
}

impl MarketCapMultipliers {
    pub fn for_class(&self, class: MarketCapClass) -> Decimal {
        match class {
            MarketCapClass::Mega => self.mega,
            MarketCapClass::Large => self.large,
            MarketCapClass::Mid => self.mid,
            MarketCapClass::Small => self.small,
            MarketCapClass::Micro => self.micro,
            MarketCapClass::Nano => self.nano,
        }
    }
}

impl Default for MarketCapMultipliers {
    fn default() -> Self {
        Self {
            mega: dec!(1.1),
            large: dec!(1.0),
            mid: dec!(0.9),
            small: dec!(0.7),
            micro: dec!(0.5),
            nano: dec!(0.3),
        }
    }
}

/// Multiplier applied per session window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDayAdjustment {
    pub peak_hour: Decimal,
    pub off_hour: Decimal,
    pub weekend: Decimal,
}

impl TimeOfDayAdjustment {
    pub fn for_session(&self, session: TradingSession) -> Decimal {
        match session {
            TradingSession::Peak => self.peak_hour,
            TradingSession::OffHours => self.off_hour,
            TradingSession::Weekend => self.weekend,
        }
    }
}

impl Default for TimeOfDayAdjustment {
    fn default() -> Self {
        Self {
            peak_hour: dec!(1.0),
            off_hour: dec!(0.9),
            weekend: dec!(0.8),
        }
    }
}

/// One concentration tier: at or above `level`, scale by `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationTier {
    /// Projected concentration share at which this tier engages.
    pub level: Decimal,
    pub multiplier: Decimal,
}

/// Complete sizer configuration.
///
/// Percentage fields are whole-number percent (a risk of `1` means 1% of
/// equity). Reloaded atomically through [`SizerConfigHandle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizerConfig {
    pub default_risk_percentage: Decimal,
    pub default_stop_loss_percentage: Decimal,
    pub default_max_position_percentage: Decimal,
    pub max_leverage: Decimal,
    pub volatility_multipliers: VolatilityMultipliers,
    pub market_cap_multipliers: MarketCapMultipliers,
    /// Exponent of the confidence curve; 0.5 makes half-confidence trades
    /// roughly 70% of full size.
    pub confidence_scale_exponent: Decimal,
    pub time_of_day_adjustment: TimeOfDayAdjustment,
    /// Tiers sorted by ascending level; the highest tier at or below the
    /// projected concentration wins.
    pub concentration_adjustment: Vec<ConcentrationTier>,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            default_risk_percentage: dec!(1),
            default_stop_loss_percentage: dec!(2),
            default_max_position_percentage: dec!(20),
            max_leverage: dec!(10),
            volatility_multipliers: VolatilityMultipliers::default(),
            market_cap_multipliers: MarketCapMultipliers::default(),
            confidence_scale_exponent: dec!(0.5),
            time_of_day_adjustment: TimeOfDayAdjustment::default(),
            concentration_adjustment: vec![
                ConcentrationTier {
                    level: dec!(0.25),
                    multiplier: dec!(0.8),
                },
                ConcentrationTier {
                    level: dec!(0.40),
                    multiplier: dec!(0.6),
                },
                ConcentrationTier {
                    level: dec!(0.50),
                    multiplier: dec!(0.4),
                },
            ],
        }
    }
}

impl SizerConfig {
    pub fn volatility_multiplier(&self, class: VolatilityClass) -> Decimal {
        self.volatility_multipliers.for_class(class)
    }

    pub fn market_cap_multiplier(&self, class: MarketCapClass) -> Decimal {
        self.market_cap_multipliers.for_class(class)
    }

    pub fn session_multiplier(&self, session: TradingSession) -> Decimal {
        self.time_of_day_adjustment.for_session(session)
    }

    /// Multiplier for a projected concentration share.
    ///
    /// Picks the highest tier whose level has been reached; below every
    /// tier the multiplier is 1.
    pub fn concentration_multiplier(&self, projected: Decimal) -> Decimal {
        self.concentration_adjustment
            .iter()
            .filter(|tier| projected >= tier.level)
            .max_by(|a, b| a.level.cmp(&b.level))
            .map(|tier| tier.multiplier)
            .unwrap_or(Decimal::ONE)
    }

    /// Confidence curve: `confidence ^ confidence_scale_exponent`, with the
    /// input clamped to `[0, 1]`.
    pub fn confidence_multiplier(&self, confidence: Decimal) -> Decimal {
        let c = confidence.clamp(Decimal::ZERO, Decimal::ONE);
        if c.is_zero() {
            return Decimal::ZERO;
        }
        if c == Decimal::ONE {
            return Decimal::ONE;
        }
        c.checked_powd(self.confidence_scale_exponent)
            .unwrap_or(Decimal::ONE)
    }
}

/// Shared handle over an immutable configuration snapshot.
///
/// Readers clone the inner `Arc`; a reload swaps the whole snapshot, so a
/// computation that started before the swap keeps its consistent view.
#[derive(Debug, Clone)]
pub struct SizerConfigHandle {
    inner: Arc<RwLock<Arc<SizerConfig>>>,
}

impl SizerConfigHandle {
    pub fn new(config: SizerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<SizerConfig> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publish a new snapshot.
    pub fn store(&self, config: SizerConfig) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(config);
    }
}

impl Default for SizerConfigHandle {
    fn default() -> Self {
        Self::new(SizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_multiplier_tables() {
        let cfg = SizerConfig::default();
        assert_eq!(cfg.volatility_multiplier(VolatilityClass::Medium), dec!(1.0));
        assert_eq!(cfg.volatility_multiplier(VolatilityClass::High), dec!(0.7));
        assert_eq!(cfg.market_cap_multiplier(MarketCapClass::Large), dec!(1.0));
        assert_eq!(cfg.market_cap_multiplier(MarketCapClass::Nano), dec!(0.3));
        assert_eq!(cfg.session_multiplier(TradingSession::Weekend), dec!(0.8));
    }

    #[test]
    fn concentration_tiers_pick_highest_reached() {
        let cfg = SizerConfig::default();
        assert_eq!(cfg.concentration_multiplier(dec!(0.1)), Decimal::ONE);
        assert_eq!(cfg.concentration_multiplier(dec!(0.25)), dec!(0.8));
        assert_eq!(cfg.concentration_multiplier(dec!(0.45)), dec!(0.6));
        assert_eq!(cfg.concentration_multiplier(dec!(0.5)), dec!(0.4));
        assert_eq!(cfg.concentration_multiplier(dec!(0.9)), dec!(0.4));
    }

    #[test]
    fn confidence_curve_boundaries() {
        let cfg = SizerConfig::default();
        assert_eq!(cfg.confidence_multiplier(Decimal::ONE), Decimal::ONE);
        assert_eq!(cfg.confidence_multiplier(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(cfg.confidence_multiplier(dec!(2)), Decimal::ONE);

        // sqrt(0.25) = 0.5 under the default exponent
        let half = cfg.confidence_multiplier(dec!(0.25));
        assert!((half - dec!(0.5)).abs() < dec!(0.0001));
    }

    #[test]
    fn handle_swaps_whole_snapshots() {
        let handle = SizerConfigHandle::default();
        let before = handle.load();
        assert_eq!(before.default_risk_percentage, dec!(1));

        let mut next = SizerConfig::default();
        next.default_risk_percentage = dec!(2);
        handle.store(next);

        // The old snapshot is still intact for in-flight readers.
        assert_eq!(before.default_risk_percentage, dec!(1));
        assert_eq!(handle.load().default_risk_percentage, dec!(2));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let cfg = SizerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: SizerConfig =
            serde_json::from_str(r#"{"default_risk_percentage": "0.5"}"#).unwrap();
        assert_eq!(cfg.default_risk_percentage, dec!(0.5));
        assert_eq!(cfg.default_stop_loss_percentage, dec!(2));
        assert_eq!(cfg.max_leverage, dec!(10));
    }
}
