//! Limit evaluators
//!
//! One pure function per [`LimitKind`]. Each compares an observation
//! derived from the evaluation context against the account's effective
//! limits and reports a [`Verdict`] carrying the action configured for that
//! kind. Evaluators share no mutable state; exemption filtering happens in
//! the engine before an evaluator runs.
//!
//! Thresholds are strict: a verdict is emitted only when the observation
//! exceeds the limit, never when it merely touches it.

use crate::risk::context::EvalContext;
use crate::types::{EffectiveLimits, LimitKind, Verdict};
use rust_decimal::Decimal;

/// Dispatch a single kind. Most kinds emit at most one verdict;
/// concentration can emit one per breaching asset.
pub fn evaluate(kind: LimitKind, limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Vec<Verdict> {
    match kind {
        LimitKind::PositionSize => position_size(limits, ctx).into_iter().collect(),
        LimitKind::OrderSize => order_size(limits, ctx).into_iter().collect(),
        LimitKind::OrderValue => order_value(limits, ctx).into_iter().collect(),
        LimitKind::NotionalValue => notional_value(limits, ctx).into_iter().collect(),
        LimitKind::MarginUtilization => margin_utilization(limits, ctx).into_iter().collect(),
        LimitKind::Leverage => leverage(limits, ctx).into_iter().collect(),
        LimitKind::Concentration => concentration(limits, ctx),
        LimitKind::Drawdown => drawdown(limits, ctx).into_iter().collect(),
        LimitKind::DailyLoss => daily_loss(limits, ctx).into_iter().collect(),
        LimitKind::TradeFrequency => trade_frequency(limits, ctx).into_iter().collect(),
    }
}

/// Projected post-trade size against the per-symbol size ceilings.
pub fn position_size(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    let pl = limits.position_limits_for(ctx.symbol)?;
    let action = limits.actions().action_for(LimitKind::PositionSize);
    let projected = ctx.projected_signed_size();

    if projected > pl.max_long_size {
        return Some(Verdict::new(
            LimitKind::PositionSize,
            action,
            projected,
            pl.max_long_size,
            format!(
                "projected long position {} on {} exceeds limit {}",
                projected, ctx.symbol, pl.max_long_size
            ),
        ));
    }
    if projected < Decimal::ZERO && projected.abs() > pl.max_short_size {
        return Some(Verdict::new(
            LimitKind::PositionSize,
            action,
            projected.abs(),
            pl.max_short_size,
            format!(
                "projected short position {} on {} exceeds limit {}",
                projected.abs(),
                ctx.symbol,
                pl.max_short_size
            ),
        ));
    }
    None
}

/// Projected post-trade notional against the per-symbol value ceilings.
pub fn notional_value(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    let pl = limits.position_limits_for(ctx.symbol)?;
    let action = limits.actions().action_for(LimitKind::NotionalValue);
    let projected = ctx.projected_symbol_notional();

    if projected > pl.max_long_value {
        return Some(Verdict::new(
            LimitKind::NotionalValue,
            action,
            projected,
            pl.max_long_value,
            format!(
                "projected long notional {} on {} exceeds limit {}",
                projected, ctx.symbol, pl.max_long_value
            ),
        ));
    }
    if projected < Decimal::ZERO && projected.abs() > pl.max_short_value {
        return Some(Verdict::new(
            LimitKind::NotionalValue,
            action,
            projected.abs(),
            pl.max_short_value,
            format!(
                "projected short notional {} on {} exceeds limit {}",
                projected.abs(),
                ctx.symbol,
                pl.max_short_value
            ),
        ));
    }
    None
}

/// Order quantity against the flat per-order ceiling.
pub fn order_size(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    let order = ctx.order?;
    let ol = limits.order_limits();
    if order.size > ol.max_order_size {
        return Some(Verdict::new(
            LimitKind::OrderSize,
            limits.actions().action_for(LimitKind::OrderSize),
            order.size,
            ol.max_order_size,
            format!(
                "order size {} on {} exceeds limit {}",
                order.size, ctx.symbol, ol.max_order_size
            ),
        ));
    }
    None
}

/// Order quote value against the flat per-order ceiling.
pub fn order_value(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    ctx.order?;
    let ol = limits.order_limits();
    let notional = ctx.order_notional();
    if notional > ol.max_order_value {
        return Some(Verdict::new(
            LimitKind::OrderValue,
            limits.actions().action_for(LimitKind::OrderValue),
            notional,
            ol.max_order_value,
            format!(
                "order value {} on {} exceeds limit {}",
                notional, ctx.symbol, ol.max_order_value
            ),
        ));
    }
    None
}

/// Projected gross exposure over equity.
pub fn leverage(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    if ctx.account.equity <= Decimal::ZERO {
        return None;
    }
    let ol = limits.order_limits();
    let observed = ctx.projected_gross_exposure() / ctx.account.equity;
    if observed > ol.max_leverage {
        return Some(Verdict::new(
            LimitKind::Leverage,
            limits.actions().action_for(LimitKind::Leverage),
            observed,
            ol.max_leverage,
            format!("projected leverage {} exceeds limit {}", observed, ol.max_leverage),
        ));
    }
    None
}

/// Post-trade margin usage over equity. Used margin is each open position's
/// absolute notional at the initial margin ratio, plus the initial margin
/// of the order itself.
pub fn margin_utilization(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    if ctx.account.equity <= Decimal::ZERO {
        return None;
    }
    let ml = limits.margin_limits();
    let used = ctx.account.gross_exposure() * ml.initial_margin_ratio
        + ctx.order_notional() * ml.initial_margin_ratio;
    let observed = used / ctx.account.equity;
    if observed > ml.max_margin_utilization {
        return Some(Verdict::new(
            LimitKind::MarginUtilization,
            limits.actions().action_for(LimitKind::MarginUtilization),
            observed,
            ml.max_margin_utilization,
            format!(
                "projected margin utilization {} exceeds limit {}",
                observed, ml.max_margin_utilization
            ),
        ));
    }
    None
}

/// Post-trade share of each base asset in gross exposure.
pub fn concentration(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Vec<Verdict> {
    let rl = limits.risk_limits();
    let action = limits.actions().action_for(LimitKind::Concentration);
    let by_asset = ctx.projected_asset_exposure();
    let total: Decimal = by_asset.values().copied().sum();
    if total.is_zero() {
        return Vec::new();
    }

    let mut verdicts: Vec<Verdict> = by_asset
        .into_iter()
        .filter_map(|(asset, notional)| {
            let share = notional / total;
            (share > rl.max_concentration).then(|| {
                Verdict::new(
                    LimitKind::Concentration,
                    action,
                    share,
                    rl.max_concentration,
                    format!(
                        "projected concentration {} in {} exceeds limit {}",
                        share, asset, rl.max_concentration
                    ),
                )
            })
        })
        .collect();
    // Deterministic reporting order regardless of map iteration.
    verdicts.sort_by(|a, b| a.message.cmp(&b.message));
    verdicts
}

/// Equity decline from the session peak.
pub fn drawdown(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    let peak = ctx.session.peak_equity;
    if peak <= Decimal::ZERO {
        return None;
    }
    let rl = limits.risk_limits();
    let observed = ((peak - ctx.account.equity) / peak)
        .clamp(Decimal::ZERO, Decimal::ONE);
    if observed > rl.max_drawdown {
        return Some(Verdict::new(
            LimitKind::Drawdown,
            limits.actions().action_for(LimitKind::Drawdown),
            observed,
            rl.max_drawdown,
            format!("drawdown {} exceeds limit {}", observed, rl.max_drawdown),
        ));
    }
    None
}

/// Realized-plus-unrealized session loss.
pub fn daily_loss(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    let rl = limits.risk_limits();
    let session_pnl = ctx.session.realized_pnl + ctx.account.unrealized_pnl();
    let loss = -session_pnl;
    if loss > rl.max_daily_loss {
        return Some(Verdict::new(
            LimitKind::DailyLoss,
            limits.actions().action_for(LimitKind::DailyLoss),
            loss,
            rl.max_daily_loss,
            format!("session loss {} exceeds limit {}", loss, rl.max_daily_loss),
        ));
    }
    None
}

/// Accepted-order counts: the rolling window first, then the daily budget.
pub fn trade_frequency(limits: &EffectiveLimits, ctx: &EvalContext<'_>) -> Option<Verdict> {
    let rl = limits.risk_limits();
    let ol = limits.order_limits();
    let action = limits.actions().action_for(LimitKind::TradeFrequency);

    let recent = Decimal::from(ctx.session.recent_orders);
    let window_limit = Decimal::from(rl.max_trade_frequency);
    if recent > window_limit {
        return Some(Verdict::new(
            LimitKind::TradeFrequency,
            action,
            recent,
            window_limit,
            format!(
                "{} orders in the last minute exceeds limit {}",
                recent, window_limit
            ),
        ));
    }

    let today = Decimal::from(ctx.session.orders_today);
    let daily_limit = Decimal::from(ol.max_daily_orders);
    if today > daily_limit {
        return Some(Verdict::new(
            LimitKind::TradeFrequency,
            action,
            today,
            daily_limit,
            format!("{} orders today exceeds daily limit {}", today, daily_limit),
        ));
    }
    None
}
