//! Shared market and account types for the Praesidium risk-control core
//!
//! This crate defines the value types that flow between the risk engine, the
//! position sizer, and their external collaborators, together with the async
//! traits those collaborators implement. Keeping them in a leaf crate lets
//! every workspace member agree on the same vocabulary without depending on
//! engine internals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Long exposure (profits when price rises)
    Long,
    /// Short exposure (profits when price falls)
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Side of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order (adds long exposure)
    Buy,
    /// Sell order (adds short exposure)
    Sell,
}

impl OrderSide {
    /// Signed direction of this side: `+1` for buys, `-1` for sells.
    pub fn direction(self) -> Decimal {
        match self {
            OrderSide::Buy => Decimal::ONE,
            OrderSide::Sell => -Decimal::ONE,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order execution type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// A prospective order submitted for risk evaluation.
///
/// Instrument symbols are opaque `BASE-QUOTE` identifiers (e.g. `BTC-USD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    /// Quantity in base units.
    pub size: Decimal,
    /// Limit price; market orders carry no price and are valued at the
    /// reference price.
    pub price: Option<Decimal>,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

impl OrderIntent {
    /// Signed size along the order's side.
    pub fn signed_size(&self) -> Decimal {
        self.size * self.side.direction()
    }
}

/// Free and locked amounts of one asset in an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub free: Decimal,
    pub locked: Decimal,
}

impl Balance {
    pub fn new(free: Decimal, locked: Decimal) -> Self {
        Self { free, locked }
    }

    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// An open position on a single instrument.
///
/// Invariant: `size == 0` implies `notional_value == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    /// Size in base units, always non-negative; direction lives in `side`.
    pub size: Decimal,
    /// Quote-currency valuation, signed with the side.
    pub notional_value: Decimal,
    pub entry_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl Position {
    /// Size signed with the position's side: long positive, short negative.
    pub fn signed_size(&self) -> Decimal {
        match self.side {
            PositionSide::Long => self.size,
            PositionSide::Short => -self.size,
        }
    }

    /// Absolute quote-currency exposure of this position.
    pub fn absolute_notional(&self) -> Decimal {
        self.notional_value.abs()
    }

    pub fn is_open(&self) -> bool {
        !self.size.is_zero()
    }
}

/// Read-only snapshot of an account as seen by the risk core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub equity: Decimal,
    /// Asset code to balance.
    pub balances: HashMap<String, Balance>,
    /// Symbol to open position.
    pub positions: HashMap<String, Position>,
}

impl AccountSnapshot {
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Free balance of one asset, zero when the asset is unknown.
    pub fn available(&self, asset: &str) -> Decimal {
        self.balances
            .get(asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of absolute notional across all open positions.
    pub fn gross_exposure(&self) -> Decimal {
        self.positions
            .values()
            .map(Position::absolute_notional)
            .sum()
    }

    /// Sum of unrealized PnL across all open positions.
    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions.values().map(|p| p.unrealized_pnl).sum()
    }

    pub fn has_open_positions(&self) -> bool {
        self.positions.values().any(Position::is_open)
    }
}

/// Base asset of a `BASE-QUOTE` symbol; the whole symbol when no separator
/// is present.
pub fn base_asset(symbol: &str) -> &str {
    symbol.split('-').next().unwrap_or(symbol)
}

/// Quote asset of a `BASE-QUOTE` symbol, if one is present.
pub fn quote_asset(symbol: &str) -> Option<&str> {
    let mut parts = symbol.splitn(2, '-');
    parts.next();
    parts.next()
}

/// Exchange metadata the sizer needs to round recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub symbol: String,
    /// Decimal places supported for base-unit quantities.
    pub base_precision: u32,
    /// Decimal places supported for quote-unit amounts.
    pub quote_precision: u32,
}

/// Failures reported by external collaborators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("market data unavailable for {symbol}: {reason}")]
    MarketDataUnavailable { symbol: String, reason: String },

    #[error("service unavailable: {reason}")]
    Unavailable { reason: String },
}

impl ServiceError {
    pub fn account_not_found(account_id: impl Into<String>) -> Self {
        Self::AccountNotFound {
            account_id: account_id.into(),
        }
    }

    pub fn market_data_unavailable(
        symbol: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MarketDataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Result type for collaborator calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Account state reads. May suspend; implementations decide freshness.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Full snapshot of one account.
    async fn account_snapshot(&self, account_id: &str) -> ServiceResult<AccountSnapshot>;

    /// Identifiers of accounts the risk core should watch.
    async fn active_account_ids(&self) -> ServiceResult<Vec<String>>;
}

/// Open-position reads, keyed by account and symbol.
#[async_trait::async_trait]
pub trait PositionService: Send + Sync {
    async fn position(&self, account_id: &str, symbol: &str) -> ServiceResult<Option<Position>>;

    async fn open_positions(&self, account_id: &str) -> ServiceResult<Vec<Position>>;
}

/// Market reference data.
#[async_trait::async_trait]
pub trait MarketDataService: Send + Sync {
    /// Current reference price used to value prospective trades.
    async fn reference_price(&self, symbol: &str) -> ServiceResult<Decimal>;

    /// Rounding metadata for the instrument.
    async fn instrument(&self, symbol: &str) -> ServiceResult<InstrumentInfo>;

    /// Market capitalization of the base asset, in quote units.
    async fn market_cap(&self, symbol: &str) -> ServiceResult<Decimal>;
}

/// Historical volatility reads.
#[async_trait::async_trait]
pub trait VolatilityService: Send + Sync {
    /// Annualized-free historical volatility (σ of daily returns) over the
    /// trailing window.
    async fn historical_volatility(&self, symbol: &str, days: u32) -> ServiceResult<Decimal>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_position() -> Position {
        Position {
            symbol: "BTC-USD".to_string(),
            side: PositionSide::Short,
            size: dec!(2),
            notional_value: dec!(-100000),
            entry_price: dec!(50000),
            unrealized_pnl: dec!(-150),
        }
    }

    #[test]
    fn signed_size_follows_side() {
        let short = btc_position();
        assert_eq!(short.signed_size(), dec!(-2));

        let long = Position {
            side: PositionSide::Long,
            notional_value: dec!(100000),
            ..short
        };
        assert_eq!(long.signed_size(), dec!(2));
    }

    #[test]
    fn order_signed_size_follows_side() {
        let order = OrderIntent {
            symbol: "ETH-USD".to_string(),
            side: OrderSide::Sell,
            size: dec!(3),
            price: Some(dec!(2000)),
            order_type: OrderType::Limit,
        };
        assert_eq!(order.signed_size(), dec!(-3));
        assert_eq!(OrderSide::Buy.direction(), Decimal::ONE);
    }

    #[test]
    fn symbol_parsing() {
        assert_eq!(base_asset("BTC-USD"), "BTC");
        assert_eq!(quote_asset("BTC-USD"), Some("USD"));
        assert_eq!(base_asset("BTCUSD"), "BTCUSD");
        assert_eq!(quote_asset("BTCUSD"), None);
    }

    #[test]
    fn snapshot_aggregates() {
        let mut positions = HashMap::new();
        positions.insert("BTC-USD".to_string(), btc_position());
        positions.insert(
            "ETH-USD".to_string(),
            Position {
                symbol: "ETH-USD".to_string(),
                side: PositionSide::Long,
                size: dec!(10),
                notional_value: dec!(20000),
                entry_price: dec!(2000),
                unrealized_pnl: dec!(75),
            },
        );
        let mut balances = HashMap::new();
        balances.insert("USD".to_string(), Balance::new(dec!(5000), dec!(1000)));

        let snapshot = AccountSnapshot {
            account_id: "acct-1".to_string(),
            equity: dec!(125000),
            balances,
            positions,
        };

        assert_eq!(snapshot.gross_exposure(), dec!(120000));
        assert_eq!(snapshot.unrealized_pnl(), dec!(-75));
        assert_eq!(snapshot.available("USD"), dec!(5000));
        assert_eq!(snapshot.available("EUR"), Decimal::ZERO);
        assert!(snapshot.has_open_positions());
    }

    #[test]
    fn order_intent_serialization_uses_type_key() {
        let order = OrderIntent {
            symbol: "BTC-USD".to_string(),
            side: OrderSide::Buy,
            size: dec!(1.5),
            price: None,
            order_type: OrderType::Market,
        };
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"type\":\"market\""));
        let back: OrderIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
