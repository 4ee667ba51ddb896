//! In-memory collaborator adapters
//!
//! Map-backed implementations of the external service traits. The
//! bootstrap binary wires these in until real drivers are attached, and
//! the integration tests script them to stage account and market state.

use async_trait::async_trait;
use praesidium_types::{
    AccountService, AccountSnapshot, InstrumentInfo, MarketDataService, Position, PositionService,
    ServiceError, ServiceResult, VolatilityService,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Account and position store; one struct serves both read traits.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<String, AccountSnapshot>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, snapshot: AccountSnapshot) {
        self.accounts
            .write()
            .await
            .insert(snapshot.account_id.clone(), snapshot);
    }

    pub async fn remove(&self, account_id: &str) {
        self.accounts.write().await.remove(account_id);
    }
}

#[async_trait]
impl AccountService for InMemoryAccounts {
    async fn account_snapshot(&self, account_id: &str) -> ServiceResult<AccountSnapshot> {
        self.accounts
            .read()
            .await
            .get(account_id)
            .cloned()
            .ok_or_else(|| ServiceError::account_not_found(account_id))
    }

    async fn active_account_ids(&self) -> ServiceResult<Vec<String>> {
        let mut ids: Vec<String> = self.accounts.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl PositionService for InMemoryAccounts {
    async fn position(&self, account_id: &str, symbol: &str) -> ServiceResult<Option<Position>> {
        let accounts = self.accounts.read().await;
        let snapshot = accounts
            .get(account_id)
            .ok_or_else(|| ServiceError::account_not_found(account_id))?;
        Ok(snapshot.position(symbol).cloned())
    }

    async fn open_positions(&self, account_id: &str) -> ServiceResult<Vec<Position>> {
        let accounts = self.accounts.read().await;
        let snapshot = accounts
            .get(account_id)
            .ok_or_else(|| ServiceError::account_not_found(account_id))?;
        Ok(snapshot
            .positions
            .values()
            .filter(|p| p.is_open())
            .cloned()
            .collect())
    }
}

/// Price, instrument, and market-cap store.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    prices: RwLock<HashMap<String, Decimal>>,
    instruments: RwLock<HashMap<String, InstrumentInfo>>,
    market_caps: RwLock<HashMap<String, Decimal>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices.write().await.insert(symbol.to_string(), price);
    }

    pub async fn set_instrument(&self, info: InstrumentInfo) {
        self.instruments
            .write()
            .await
            .insert(info.symbol.clone(), info);
    }

    pub async fn set_market_cap(&self, symbol: &str, cap: Decimal) {
        self.market_caps
            .write()
            .await
            .insert(symbol.to_string(), cap);
    }
}

#[async_trait]
impl MarketDataService for InMemoryMarketData {
    async fn reference_price(&self, symbol: &str) -> ServiceResult<Decimal> {
        self.prices
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| ServiceError::market_data_unavailable(symbol, "no reference price"))
    }

    async fn instrument(&self, symbol: &str) -> ServiceResult<InstrumentInfo> {
        self.instruments
            .read()
            .await
            .get(symbol)
            .cloned()
            .ok_or_else(|| ServiceError::market_data_unavailable(symbol, "no instrument metadata"))
    }

    async fn market_cap(&self, symbol: &str) -> ServiceResult<Decimal> {
        self.market_caps
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| ServiceError::market_data_unavailable(symbol, "no market cap"))
    }
}

/// Historical-volatility store.
#[derive(Debug, Default)]
pub struct InMemoryVolatility {
    readings: RwLock<HashMap<String, Decimal>>,
}

impl InMemoryVolatility {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_volatility(&self, symbol: &str, sigma: Decimal) {
        self.readings
            .write()
            .await
            .insert(symbol.to_string(), sigma);
    }
}

#[async_trait]
impl VolatilityService for InMemoryVolatility {
    async fn historical_volatility(&self, symbol: &str, _days: u32) -> ServiceResult<Decimal> {
        self.readings
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| ServiceError::unavailable(format!("no volatility series for {symbol}")))
    }
}
