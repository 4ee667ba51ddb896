//! Per-account limit overrides and effective-limit resolution
//!
//! An account points at a profile and may override individual fields.
//! Merging is field-wise: an override that sets only `max_long_size` for
//! one symbol leaves every other field reading from the profile, including
//! the rest of that symbol's position limits. Exemption sets union.

use crate::types::limits::{
    ActionPolicy, LimitKind, MarginLimits, OrderLimits, PositionLimits, RiskLimits, RiskProfile,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Sparse override of one symbol's position limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLimitsOverride {
    pub max_long_size: Option<Decimal>,
    pub max_short_size: Option<Decimal>,
    pub max_long_value: Option<Decimal>,
    pub max_short_value: Option<Decimal>,
}

impl PositionLimitsOverride {
    fn apply(&self, base: PositionLimits) -> PositionLimits {
        PositionLimits {
            max_long_size: self.max_long_size.unwrap_or(base.max_long_size),
            max_short_size: self.max_short_size.unwrap_or(base.max_short_size),
            max_long_value: self.max_long_value.unwrap_or(base.max_long_value),
            max_short_value: self.max_short_value.unwrap_or(base.max_short_value),
        }
    }
}

/// Sparse override of the order limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLimitsOverride {
    pub max_order_size: Option<Decimal>,
    pub max_order_value: Option<Decimal>,
    pub max_leverage: Option<Decimal>,
    pub max_daily_orders: Option<u32>,
}

impl OrderLimitsOverride {
    fn apply(&self, base: OrderLimits) -> OrderLimits {
        OrderLimits {
            max_order_size: self.max_order_size.unwrap_or(base.max_order_size),
            max_order_value: self.max_order_value.unwrap_or(base.max_order_value),
            max_leverage: self.max_leverage.unwrap_or(base.max_leverage),
            max_daily_orders: self.max_daily_orders.unwrap_or(base.max_daily_orders),
        }
    }
}

/// Sparse override of the margin limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginLimitsOverride {
    pub max_margin_utilization: Option<Decimal>,
    pub initial_margin_ratio: Option<Decimal>,
    pub maintenance_margin_ratio: Option<Decimal>,
    pub liquidation_threshold: Option<Decimal>,
}

impl MarginLimitsOverride {
    fn apply(&self, base: MarginLimits) -> MarginLimits {
        MarginLimits {
            max_margin_utilization: self
                .max_margin_utilization
                .unwrap_or(base.max_margin_utilization),
            initial_margin_ratio: self.initial_margin_ratio.unwrap_or(base.initial_margin_ratio),
            maintenance_margin_ratio: self
                .maintenance_margin_ratio
                .unwrap_or(base.maintenance_margin_ratio),
            liquidation_threshold: self
                .liquidation_threshold
                .unwrap_or(base.liquidation_threshold),
        }
    }
}

/// Sparse override of the portfolio risk limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskLimitsOverride {
    pub max_concentration: Option<Decimal>,
    pub max_drawdown: Option<Decimal>,
    pub max_daily_loss: Option<Decimal>,
    pub max_trade_frequency: Option<u32>,
}

impl RiskLimitsOverride {
    fn apply(&self, base: RiskLimits) -> RiskLimits {
        RiskLimits {
            max_concentration: self.max_concentration.unwrap_or(base.max_concentration),
            max_drawdown: self.max_drawdown.unwrap_or(base.max_drawdown),
            max_daily_loss: self.max_daily_loss.unwrap_or(base.max_daily_loss),
            max_trade_frequency: self.max_trade_frequency.unwrap_or(base.max_trade_frequency),
        }
    }
}

/// The per-account override layer stored by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRiskLimits {
    /// Profile this account resolves against.
    pub profile_id: String,
    #[serde(default)]
    pub position_limits: HashMap<String, PositionLimitsOverride>,
    #[serde(default)]
    pub order_limits: Option<OrderLimitsOverride>,
    #[serde(default)]
    pub margin_limits: Option<MarginLimitsOverride>,
    #[serde(default)]
    pub risk_limits: Option<RiskLimitsOverride>,
    /// Extra exemptions on top of the profile's defaults.
    #[serde(default)]
    pub exemptions: BTreeSet<LimitKind>,
}

impl AccountRiskLimits {
    pub fn for_profile(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            position_limits: HashMap::new(),
            order_limits: None,
            margin_limits: None,
            risk_limits: None,
            exemptions: BTreeSet::new(),
        }
    }
}

/// Limits after the account's overrides are merged over its profile.
///
/// Resolution is a pure snapshot; the engine resolves once per evaluation
/// so a concurrent profile swap cannot produce a torn view.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveLimits {
    profile: RiskProfile,
    overrides: Option<AccountRiskLimits>,
    exemptions: BTreeSet<LimitKind>,
}

impl EffectiveLimits {
    pub fn resolve(profile: &RiskProfile, overrides: Option<&AccountRiskLimits>) -> Self {
        let mut exemptions = profile.default_exemptions.clone();
        if let Some(acct) = overrides {
            exemptions.extend(acct.exemptions.iter().copied());
        }
        Self {
            profile: profile.clone(),
            overrides: overrides.cloned(),
            exemptions,
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile.id
    }

    pub fn is_exempt(&self, kind: LimitKind) -> bool {
        self.exemptions.contains(&kind)
    }

    pub fn actions(&self) -> &ActionPolicy {
        &self.profile.actions
    }

    /// Effective position limits for a symbol.
    ///
    /// The profile resolves the symbol first (explicit entry, then its
    /// `default` entry); the override for that symbol, if any, then patches
    /// individual fields. `None` when the profile has no entry at all.
    pub fn position_limits_for(&self, symbol: &str) -> Option<PositionLimits> {
        let base = *self.profile.position_limits_for(symbol)?;
        let patched = self
            .overrides
            .as_ref()
            .and_then(|acct| acct.position_limits.get(symbol))
            .map(|ovr| ovr.apply(base))
            .unwrap_or(base);
        Some(patched)
    }

    pub fn order_limits(&self) -> OrderLimits {
        let base = self.profile.order_limits;
        self.overrides
            .as_ref()
            .and_then(|acct| acct.order_limits.as_ref())
            .map(|ovr| ovr.apply(base))
            .unwrap_or(base)
    }

    pub fn margin_limits(&self) -> MarginLimits {
        let base = self.profile.margin_limits;
        self.overrides
            .as_ref()
            .and_then(|acct| acct.margin_limits.as_ref())
            .map(|ovr| ovr.apply(base))
            .unwrap_or(base)
    }

    pub fn risk_limits(&self) -> RiskLimits {
        let base = self.profile.risk_limits;
        self.overrides
            .as_ref()
            .and_then(|acct| acct.risk_limits.as_ref())
            .map(|ovr| ovr.apply(base))
            .unwrap_or(base)
    }
}
