//! Evaluation context shared by all limit evaluators
//!
//! One context is assembled per evaluation pass from the account snapshot,
//! the prospective order (absent on the monitor path), the reference price,
//! and the session counters. Evaluators only read it, which is what keeps
//! them pure.

use crate::risk::session::SessionSnapshot;
use praesidium_types::{base_asset, AccountSnapshot, OrderIntent};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    pub account: &'a AccountSnapshot,
    /// Symbol under evaluation: the order's symbol, or the monitored
    /// position's symbol.
    pub symbol: &'a str,
    /// Present on the order path only.
    pub order: Option<&'a OrderIntent>,
    pub reference_price: Decimal,
    pub session: SessionSnapshot,
}

impl<'a> EvalContext<'a> {
    /// Current signed position size on the symbol (long positive).
    pub fn current_signed_size(&self) -> Decimal {
        self.account
            .position(self.symbol)
            .map(|p| p.signed_size())
            .unwrap_or(Decimal::ZERO)
    }

    /// Post-trade signed size: current plus the order along its side.
    pub fn projected_signed_size(&self) -> Decimal {
        self.current_signed_size()
            + self
                .order
                .map(|o| o.signed_size())
                .unwrap_or(Decimal::ZERO)
    }

    /// Price used to value the order: its limit price, else the reference.
    pub fn order_price(&self) -> Decimal {
        self.order
            .and_then(|o| o.price)
            .unwrap_or(self.reference_price)
    }

    /// Absolute quote value of the order itself.
    pub fn order_notional(&self) -> Decimal {
        self.order
            .map(|o| o.size * self.order_price())
            .unwrap_or(Decimal::ZERO)
            .abs()
    }

    /// Signed post-trade notional on the symbol, valued at the reference.
    pub fn projected_symbol_notional(&self) -> Decimal {
        self.projected_signed_size() * self.reference_price
    }

    /// Whether the order grows absolute exposure on the symbol. Without an
    /// order there is nothing being reduced, so this reports true.
    pub fn increases_exposure(&self) -> bool {
        match self.order {
            Some(_) => self.projected_signed_size().abs() > self.current_signed_size().abs(),
            None => true,
        }
    }

    /// Whether the order strictly shrinks absolute exposure on the symbol.
    pub fn reduces_exposure(&self) -> bool {
        self.order.is_some()
            && self.projected_signed_size().abs() < self.current_signed_size().abs()
    }

    /// Post-trade gross exposure: all positions' absolute notional, with
    /// this symbol's contribution replaced by its projection.
    pub fn projected_gross_exposure(&self) -> Decimal {
        let current_symbol_abs = self
            .account
            .position(self.symbol)
            .map(|p| p.absolute_notional())
            .unwrap_or(Decimal::ZERO);
        self.account.gross_exposure() - current_symbol_abs
            + self.projected_symbol_notional().abs()
    }

    /// Post-trade absolute notional grouped by base asset.
    pub fn projected_asset_exposure(&self) -> HashMap<String, Decimal> {
        let mut by_asset: HashMap<String, Decimal> = HashMap::new();
        for position in self.account.positions.values() {
            if position.symbol == self.symbol {
                continue;
            }
            *by_asset
                .entry(base_asset(&position.symbol).to_string())
                .or_default() += position.absolute_notional();
        }
        let projected = self.projected_symbol_notional().abs();
        if !projected.is_zero() {
            *by_asset
                .entry(base_asset(self.symbol).to_string())
                .or_default() += projected;
        }
        by_asset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praesidium_types::{
        Balance, OrderSide, OrderType, Position, PositionSide,
    };
    use rust_decimal_macros::dec;

    fn account_with_btc(size: Decimal, side: PositionSide) -> AccountSnapshot {
        let mut positions = HashMap::new();
        let signed = match side {
            PositionSide::Long => size,
            PositionSide::Short => -size,
        };
        positions.insert(
            "BTC-USD".to_string(),
            Position {
                symbol: "BTC-USD".to_string(),
                side,
                size,
                notional_value: signed * dec!(50000),
                entry_price: dec!(50000),
                unrealized_pnl: Decimal::ZERO,
            },
        );
        let mut balances = HashMap::new();
        balances.insert("USD".to_string(), Balance::new(dec!(100000), Decimal::ZERO));
        AccountSnapshot {
            account_id: "acct-1".to_string(),
            equity: dec!(100000),
            balances,
            positions,
        }
    }

    fn order(side: OrderSide, size: Decimal) -> OrderIntent {
        OrderIntent {
            symbol: "BTC-USD".to_string(),
            side,
            size,
            price: None,
            order_type: OrderType::Market,
        }
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            peak_equity: dec!(100000),
            realized_pnl: Decimal::ZERO,
            recent_orders: 0,
            orders_today: 0,
        }
    }

    #[test]
    fn projection_adds_along_order_side() {
        let account = account_with_btc(dec!(2), PositionSide::Long);
        let buy = order(OrderSide::Buy, dec!(3));
        let ctx = EvalContext {
            account: &account,
            symbol: "BTC-USD",
            order: Some(&buy),
            reference_price: dec!(50000),
            session: snapshot(),
        };

        assert_eq!(ctx.current_signed_size(), dec!(2));
        assert_eq!(ctx.projected_signed_size(), dec!(5));
        assert!(ctx.increases_exposure());
        assert!(!ctx.reduces_exposure());
    }

    #[test]
    fn sell_against_long_reduces() {
        let account = account_with_btc(dec!(2), PositionSide::Long);
        let sell = order(OrderSide::Sell, dec!(1));
        let ctx = EvalContext {
            account: &account,
            symbol: "BTC-USD",
            order: Some(&sell),
            reference_price: dec!(50000),
            session: snapshot(),
        };

        assert_eq!(ctx.projected_signed_size(), dec!(1));
        assert!(ctx.reduces_exposure());
        assert!(!ctx.increases_exposure());
    }

    #[test]
    fn crossing_through_flat_increases_the_other_way() {
        let account = account_with_btc(dec!(2), PositionSide::Long);
        let sell = order(OrderSide::Sell, dec!(5));
        let ctx = EvalContext {
            account: &account,
            symbol: "BTC-USD",
            order: Some(&sell),
            reference_price: dec!(50000),
            session: snapshot(),
        };

        assert_eq!(ctx.projected_signed_size(), dec!(-3));
        assert!(ctx.increases_exposure());
    }

    #[test]
    fn gross_exposure_replaces_symbol_contribution() {
        let mut account = account_with_btc(dec!(2), PositionSide::Long);
        account.positions.insert(
            "ETH-USD".to_string(),
            Position {
                symbol: "ETH-USD".to_string(),
                side: PositionSide::Long,
                size: dec!(10),
                notional_value: dec!(20000),
                entry_price: dec!(2000),
                unrealized_pnl: Decimal::ZERO,
            },
        );
        let buy = order(OrderSide::Buy, dec!(1));
        let ctx = EvalContext {
            account: &account,
            symbol: "BTC-USD",
            order: Some(&buy),
            reference_price: dec!(50000),
            session: snapshot(),
        };

        // BTC projects to 3 * 50000 = 150000, ETH stays at 20000.
        assert_eq!(ctx.projected_gross_exposure(), dec!(170000));

        let by_asset = ctx.projected_asset_exposure();
        assert_eq!(by_asset.get("BTC"), Some(&dec!(150000)));
        assert_eq!(by_asset.get("ETH"), Some(&dec!(20000)));
    }

    #[test]
    fn monitor_path_has_no_reduction() {
        let account = account_with_btc(dec!(2), PositionSide::Short);
        let ctx = EvalContext {
            account: &account,
            symbol: "BTC-USD",
            order: None,
            reference_price: dec!(50000),
            session: snapshot(),
        };

        assert_eq!(ctx.projected_signed_size(), dec!(-2));
        assert!(ctx.increases_exposure());
        assert!(!ctx.reduces_exposure());
        assert_eq!(ctx.order_notional(), Decimal::ZERO);
    }
}
