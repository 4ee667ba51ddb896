//! Limit value types and enforcement actions
//!
//! A [`RiskProfile`] bundles every limit family with the action taken when
//! a limit is breached. Profiles are immutable once published; updates swap
//! the whole profile rather than mutating in place.

use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Key under which symbol-independent position limits are stored.
pub const DEFAULT_POSITION_LIMITS: &str = "default";

/// The kinds of limit the engine evaluates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitKind {
    PositionSize,
    OrderSize,
    OrderValue,
    NotionalValue,
    MarginUtilization,
    Leverage,
    Concentration,
    Drawdown,
    DailyLoss,
    TradeFrequency,
}

impl LimitKind {
    /// Every kind, in evaluation order.
    pub const ALL: [LimitKind; 10] = [
        LimitKind::PositionSize,
        LimitKind::OrderSize,
        LimitKind::OrderValue,
        LimitKind::NotionalValue,
        LimitKind::MarginUtilization,
        LimitKind::Leverage,
        LimitKind::Concentration,
        LimitKind::Drawdown,
        LimitKind::DailyLoss,
        LimitKind::TradeFrequency,
    ];

    /// Kinds meaningful without a prospective order, re-checked by the
    /// periodic monitor against open positions.
    pub const POSITION_CENTRIC: [LimitKind; 6] = [
        LimitKind::NotionalValue,
        LimitKind::MarginUtilization,
        LimitKind::Leverage,
        LimitKind::Concentration,
        LimitKind::Drawdown,
        LimitKind::DailyLoss,
    ];
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LimitKind::PositionSize => "POSITION_SIZE",
            LimitKind::OrderSize => "ORDER_SIZE",
            LimitKind::OrderValue => "ORDER_VALUE",
            LimitKind::NotionalValue => "NOTIONAL_VALUE",
            LimitKind::MarginUtilization => "MARGIN_UTILIZATION",
            LimitKind::Leverage => "LEVERAGE",
            LimitKind::Concentration => "CONCENTRATION",
            LimitKind::Drawdown => "DRAWDOWN",
            LimitKind::DailyLoss => "DAILY_LOSS",
            LimitKind::TradeFrequency => "TRADE_FREQUENCY",
        };
        write!(f, "{}", name)
    }
}

/// Graded enforcement action, totally ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Record only; the order proceeds untouched
    Notify,
    /// Surface to the trader; the order proceeds
    Warn,
    /// Only exposure-reducing orders may proceed
    ReduceOnly,
    /// The order is refused
    Reject,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Notify => "NOTIFY",
            Action::Warn => "WARN",
            Action::ReduceOnly => "REDUCE_ONLY",
            Action::Reject => "REJECT",
        };
        write!(f, "{}", name)
    }
}

/// Total mapping from limit kind to enforcement action.
///
/// A kind with no configured entry reads as [`Action::Notify`], so adding a
/// new kind can never silently reject orders on a stale profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionPolicy(BTreeMap<LimitKind, Action>);

impl ActionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry insertion.
    pub fn with(mut self, kind: LimitKind, action: Action) -> Self {
        self.0.insert(kind, action);
        self
    }

    pub fn set(&mut self, kind: LimitKind, action: Action) {
        self.0.insert(kind, action);
    }

    /// Action for a kind; unconfigured kinds are `Notify`.
    pub fn action_for(&self, kind: LimitKind) -> Action {
        self.0.get(&kind).copied().unwrap_or(Action::Notify)
    }

    /// Whether the kind has an explicit entry.
    pub fn is_configured(&self, kind: LimitKind) -> bool {
        self.0.contains_key(&kind)
    }
}

/// Per-symbol position ceilings, sized in base units and quote value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionLimits {
    pub max_long_size: Decimal,
    pub max_short_size: Decimal,
    pub max_long_value: Decimal,
    pub max_short_value: Decimal,
}

/// Per-order ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderLimits {
    pub max_order_size: Decimal,
    pub max_order_value: Decimal,
    pub max_leverage: Decimal,
    pub max_daily_orders: u32,
}

/// Margin constraints.
///
/// `maintenance_margin_ratio` and `liquidation_threshold` are carried for a
/// downstream liquidation engine; no evaluator here consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginLimits {
    pub max_margin_utilization: Decimal,
    pub initial_margin_ratio: Decimal,
    pub maintenance_margin_ratio: Decimal,
    pub liquidation_threshold: Decimal,
}

/// Portfolio-level risk constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub max_concentration: Decimal,
    pub max_drawdown: Decimal,
    pub max_daily_loss: Decimal,
    pub max_trade_frequency: u32,
}

/// A named bundle of limits and per-limit actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub id: String,
    /// Symbol to limits; the `default` entry backs unknown symbols.
    pub position_limits: HashMap<String, PositionLimits>,
    pub order_limits: OrderLimits,
    pub margin_limits: MarginLimits,
    pub risk_limits: RiskLimits,
    pub actions: ActionPolicy,
    pub default_exemptions: BTreeSet<LimitKind>,
}

impl RiskProfile {
    /// Position limits for a symbol, falling back to the `default` entry.
    pub fn position_limits_for(&self, symbol: &str) -> Option<&PositionLimits> {
        self.position_limits
            .get(symbol)
            .or_else(|| self.position_limits.get(DEFAULT_POSITION_LIMITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn action_order_is_total() {
        assert!(Action::Notify < Action::Warn);
        assert!(Action::Warn < Action::ReduceOnly);
        assert!(Action::ReduceOnly < Action::Reject);

        let strongest = [Action::Warn, Action::Reject, Action::Notify]
            .into_iter()
            .max()
            .unwrap();
        assert_eq!(strongest, Action::Reject);
    }

    #[test]
    fn unconfigured_kind_reads_as_notify() {
        let policy = ActionPolicy::new().with(LimitKind::OrderSize, Action::Warn);
        assert_eq!(policy.action_for(LimitKind::OrderSize), Action::Warn);
        assert_eq!(policy.action_for(LimitKind::Drawdown), Action::Notify);
    }

    #[test]
    fn position_limits_fall_back_to_default() {
        let mut position_limits = HashMap::new();
        position_limits.insert(
            "BTC-USD".to_string(),
            PositionLimits {
                max_long_size: dec!(5),
                max_short_size: dec!(5),
                max_long_value: dec!(500000),
                max_short_value: dec!(500000),
            },
        );
        position_limits.insert(
            DEFAULT_POSITION_LIMITS.to_string(),
            PositionLimits {
                max_long_size: dec!(1),
                max_short_size: dec!(1),
                max_long_value: dec!(10000),
                max_short_value: dec!(10000),
            },
        );

        let profile = RiskProfile {
            id: "test".to_string(),
            position_limits,
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
            actions: ActionPolicy::new(),
            default_exemptions: BTreeSet::new(),
        };

        assert_eq!(
            profile.position_limits_for("BTC-USD").unwrap().max_long_size,
            dec!(5)
        );
        assert_eq!(
            profile.position_limits_for("DOGE-USD").unwrap().max_long_size,
            dec!(1)
        );
    }

    #[test]
    fn limit_kind_serializes_screaming() {
        let json = serde_json::to_string(&LimitKind::MarginUtilization).unwrap();
        assert_eq!(json, "\"MARGIN_UTILIZATION\"");
        let json = serde_json::to_string(&Action::ReduceOnly).unwrap();
        assert_eq!(json, "\"REDUCE_ONLY\"");
    }
}
