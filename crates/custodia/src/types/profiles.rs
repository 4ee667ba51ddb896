//! Built-in risk profiles seeded when the profile store is empty
//!
//! Four tiers ship as seed data. The literals here are the canonical
//! values; deployments adjust them through `update_risk_profile` rather
//! than by editing this module.

use crate::types::limits::{
    Action, ActionPolicy, LimitKind, MarginLimits, OrderLimits, PositionLimits, RiskLimits,
    RiskProfile, DEFAULT_POSITION_LIMITS,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeSet, HashMap};

pub const CONSERVATIVE: &str = "conservative";
pub const MODERATE: &str = "moderate";
pub const AGGRESSIVE: &str = "aggressive";
pub const INSTITUTIONAL: &str = "institutional";

fn symmetric(max_size: Decimal, max_value: Decimal) -> PositionLimits {
    PositionLimits {
        max_long_size: max_size,
        max_short_size: max_size,
        max_long_value: max_value,
        max_short_value: max_value,
    }
}

fn position_limits(
    btc_size: Decimal,
    btc_value: Decimal,
    eth_size: Decimal,
    eth_value: Decimal,
    default_size: Decimal,
    default_value: Decimal,
) -> HashMap<String, PositionLimits> {
    let mut limits = HashMap::new();
    limits.insert("BTC-USD".to_string(), symmetric(btc_size, btc_value));
    limits.insert("ETH-USD".to_string(), symmetric(eth_size, eth_value));
    limits.insert(
        DEFAULT_POSITION_LIMITS.to_string(),
        symmetric(default_size, default_value),
    );
    limits
}

/// The conservative tier: every breach is hard, except the limits that can
/// only be worked off by reducing exposure.
pub fn conservative() -> RiskProfile {
    RiskProfile {
        id: CONSERVATIVE.to_string(),
        position_limits: position_limits(
            dec!(5),
            dec!(500000),
            dec!(50),
            dec!(250000),
            dec!(5),
            dec!(100000),
        ),
        order_limits: OrderLimits {
            max_order_size: dec!(5),
            max_order_value: dec!(50000),
            max_leverage: dec!(5),
            max_daily_orders: 500,
        },
        margin_limits: MarginLimits {
            max_margin_utilization: dec!(0.6),
            initial_margin_ratio: dec!(0.15),
            maintenance_margin_ratio: dec!(0.075),
            liquidation_threshold: dec!(0.85),
        },
        risk_limits: RiskLimits {
            max_concentration: dec!(0.2),
            max_drawdown: dec!(0.2),
            max_daily_loss: dec!(5000),
            max_trade_frequency: 30,
        },
        actions: ActionPolicy::new()
            .with(LimitKind::PositionSize, Action::Reject)
            .with(LimitKind::OrderSize, Action::Reject)
            .with(LimitKind::OrderValue, Action::Reject)
            .with(LimitKind::NotionalValue, Action::Reject)
            .with(LimitKind::MarginUtilization, Action::Reject)
            .with(LimitKind::Leverage, Action::Reject)
            .with(LimitKind::Concentration, Action::Warn)
            .with(LimitKind::Drawdown, Action::ReduceOnly)
            .with(LimitKind::DailyLoss, Action::ReduceOnly)
            .with(LimitKind::TradeFrequency, Action::Reject),
        default_exemptions: BTreeSet::new(),
    }
}

/// The standard tier most accounts start on.
pub fn moderate() -> RiskProfile {
    RiskProfile {
        id: MODERATE.to_string(),
        position_limits: position_limits(
            dec!(10),
            dec!(1000000),
            dec!(100),
            dec!(500000),
            dec!(10),
            dec!(200000),
        ),
        order_limits: OrderLimits {
            max_order_size: dec!(10),
            max_order_value: dec!(100000),
            max_leverage: dec!(10),
            max_daily_orders: 1000,
        },
        margin_limits: MarginLimits {
            max_margin_utilization: dec!(0.8),
            initial_margin_ratio: dec!(0.10),
            maintenance_margin_ratio: dec!(0.05),
            liquidation_threshold: dec!(0.90),
        },
        risk_limits: RiskLimits {
            max_concentration: dec!(0.25),
            max_drawdown: dec!(0.3),
            max_daily_loss: dec!(10000),
            max_trade_frequency: 60,
        },
        actions: ActionPolicy::new()
            .with(LimitKind::PositionSize, Action::Reject)
            .with(LimitKind::OrderSize, Action::Reject)
            .with(LimitKind::OrderValue, Action::Warn)
            .with(LimitKind::NotionalValue, Action::Reject)
            .with(LimitKind::MarginUtilization, Action::Reject)
            .with(LimitKind::Leverage, Action::Reject)
            .with(LimitKind::Concentration, Action::Warn)
            .with(LimitKind::Drawdown, Action::ReduceOnly)
            .with(LimitKind::DailyLoss, Action::ReduceOnly)
            .with(LimitKind::TradeFrequency, Action::Warn),
        default_exemptions: BTreeSet::new(),
    }
}

/// The aggressive tier: soft warnings on size and value limits, hard stop
/// on margin only. Trade frequency is exempt.
pub fn aggressive() -> RiskProfile {
    RiskProfile {
        id: AGGRESSIVE.to_string(),
        position_limits: position_limits(
            dec!(20),
            dec!(2000000),
            dec!(200),
            dec!(1000000),
            dec!(20),
            dec!(400000),
        ),
        order_limits: OrderLimits {
            max_order_size: dec!(20),
            max_order_value: dec!(200000),
            max_leverage: dec!(20),
            max_daily_orders: 2000,
        },
        margin_limits: MarginLimits {
            max_margin_utilization: dec!(0.9),
            initial_margin_ratio: dec!(0.05),
            maintenance_margin_ratio: dec!(0.025),
            liquidation_threshold: dec!(0.95),
        },
        risk_limits: RiskLimits {
            max_concentration: dec!(0.4),
            max_drawdown: dec!(0.4),
            max_daily_loss: dec!(20000),
            max_trade_frequency: 120,
        },
        actions: ActionPolicy::new()
            .with(LimitKind::PositionSize, Action::Warn)
            .with(LimitKind::OrderSize, Action::Warn)
            .with(LimitKind::OrderValue, Action::Warn)
            .with(LimitKind::NotionalValue, Action::Warn)
            .with(LimitKind::MarginUtilization, Action::Reject)
            .with(LimitKind::Leverage, Action::Warn)
            .with(LimitKind::Concentration, Action::Notify)
            .with(LimitKind::Drawdown, Action::Warn)
            .with(LimitKind::DailyLoss, Action::ReduceOnly)
            .with(LimitKind::TradeFrequency, Action::Notify),
        default_exemptions: [LimitKind::TradeFrequency].into_iter().collect(),
    }
}

/// The institutional tier: large ceilings, hard enforcement on value and
/// margin limits, concentration and frequency exempt.
pub fn institutional() -> RiskProfile {
    RiskProfile {
        id: INSTITUTIONAL.to_string(),
        position_limits: position_limits(
            dec!(100),
            dec!(10000000),
            dec!(1000),
            dec!(5000000),
            dec!(50),
            dec!(1000000),
        ),
        order_limits: OrderLimits {
            max_order_size: dec!(50),
            max_order_value: dec!(1000000),
            max_leverage: dec!(10),
            max_daily_orders: 5000,
        },
        margin_limits: MarginLimits {
            max_margin_utilization: dec!(0.85),
            initial_margin_ratio: dec!(0.08),
            maintenance_margin_ratio: dec!(0.04),
            liquidation_threshold: dec!(0.92),
        },
        risk_limits: RiskLimits {
            max_concentration: dec!(0.3),
            max_drawdown: dec!(0.35),
            max_daily_loss: dec!(100000),
            max_trade_frequency: 500,
        },
        actions: ActionPolicy::new()
            .with(LimitKind::PositionSize, Action::Reject)
            .with(LimitKind::OrderSize, Action::Warn)
            .with(LimitKind::OrderValue, Action::Reject)
            .with(LimitKind::NotionalValue, Action::Reject)
            .with(LimitKind::MarginUtilization, Action::Reject)
            .with(LimitKind::Leverage, Action::Reject)
            .with(LimitKind::Concentration, Action::Notify)
            .with(LimitKind::Drawdown, Action::Warn)
            .with(LimitKind::DailyLoss, Action::Warn)
            .with(LimitKind::TradeFrequency, Action::Notify),
        default_exemptions: [LimitKind::TradeFrequency, LimitKind::Concentration]
            .into_iter()
            .collect(),
    }
}

/// All built-in profiles, seeded in this order.
pub fn builtin_profiles() -> Vec<RiskProfile> {
    vec![conservative(), moderate(), aggressive(), institutional()]
}
