//! The adaptive position sizer
//!
//! Resolves everything the pure sizing pipeline needs, account equity,
//! reference price, instrument precision, classifier readings, then hands
//! the arithmetic to `mensura`. Classifier failures never refuse a sizing
//! request; they fall back to the neutral class and log. Missing accounts,
//! missing market data, and degenerate stops are hard refusals.

use crate::RiskError;
use chrono::Utc;
use mensura::{
    AdjustmentFactors, MarketCapClass, PositionSizingResult, SizerConfig, SizerConfigHandle,
    SizingCalculator, SizingInputs, TradeDirection, TradingSession, VolatilityClass,
};
use praesidium_types::{
    base_asset, quote_asset, AccountService, AccountSnapshot, MarketDataService, VolatilityService,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Lookback for the volatility classifier.
const VOLATILITY_WINDOW_DAYS: u32 = 30;

const HUNDRED: Decimal = rust_decimal_macros::dec!(100);

/// A sizing request. Everything optional falls back to the sizer
/// configuration or a service lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSizingParams {
    pub account_id: String,
    pub symbol: String,
    pub direction: TradeDirection,
    /// Intended entry; the reference price when absent.
    pub entry_price: Option<Decimal>,
    pub stop_loss_percentage: Option<Decimal>,
    pub risk_percentage: Option<Decimal>,
    pub max_position_percentage: Option<Decimal>,
    /// Trader conviction in `[0, 1]`; absent means full size.
    pub confidence: Option<Decimal>,
    /// Explicit multiplier overriding the volatility classifier.
    pub volatility_adjustment: Option<Decimal>,
    /// Explicit multiplier overriding the market-cap classifier.
    pub market_cap_adjustment: Option<Decimal>,
}

impl PositionSizingParams {
    pub fn new(
        account_id: impl Into<String>,
        symbol: impl Into<String>,
        direction: TradeDirection,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            symbol: symbol.into(),
            direction,
            entry_price: None,
            stop_loss_percentage: None,
            risk_percentage: None,
            max_position_percentage: None,
            confidence: None,
            volatility_adjustment: None,
            market_cap_adjustment: None,
        }
    }
}

/// Sizer façade over the account, market-data, and volatility
/// collaborators.
pub struct AdaptivePositionSizer {
    accounts: Arc<dyn AccountService>,
    market_data: Arc<dyn MarketDataService>,
    volatility: Arc<dyn VolatilityService>,
    config: SizerConfigHandle,
    calculator: SizingCalculator,
}

impl AdaptivePositionSizer {
    pub fn new(
        accounts: Arc<dyn AccountService>,
        market_data: Arc<dyn MarketDataService>,
        volatility: Arc<dyn VolatilityService>,
        config: SizerConfigHandle,
    ) -> Self {
        Self {
            accounts,
            market_data,
            volatility,
            config,
            calculator: SizingCalculator::new(),
        }
    }

    /// Handle used by the configuration reload subscriber.
    pub fn config_handle(&self) -> SizerConfigHandle {
        self.config.clone()
    }

    /// Produce a size recommendation for a prospective trade.
    #[instrument(level = "debug", skip(self, params),
        fields(account_id = %params.account_id, symbol = %params.symbol))]
    pub async fn recommend(
        &self,
        params: &PositionSizingParams,
    ) -> Result<PositionSizingResult, RiskError> {
        let cfg = self.config.load();
        let account = self.accounts.account_snapshot(&params.account_id).await?;

        let entry_price = match params.entry_price {
            Some(price) => price,
            None => self.market_data.reference_price(&params.symbol).await?,
        };
        let instrument = self.market_data.instrument(&params.symbol).await?;

        let risk_percentage = params
            .risk_percentage
            .unwrap_or(cfg.default_risk_percentage);
        let stop_loss_percentage = params
            .stop_loss_percentage
            .unwrap_or(cfg.default_stop_loss_percentage);
        let max_position_percentage = params
            .max_position_percentage
            .unwrap_or(cfg.default_max_position_percentage);

        // The balance cap degenerates to the equity ceiling for symbols
        // without a parseable quote asset.
        let available_quote = quote_asset(&params.symbol)
            .map(|asset| account.available(asset))
            .unwrap_or(account.equity);

        let factors = AdjustmentFactors {
            volatility: self.volatility_factor(&cfg, params).await,
            market_cap: self.market_cap_factor(&cfg, params).await,
            confidence: params
                .confidence
                .map(|c| cfg.confidence_multiplier(c))
                .unwrap_or(Decimal::ONE),
            concentration: self.concentration_factor(
                &cfg,
                &account,
                &params.symbol,
                entry_price,
                risk_percentage,
                stop_loss_percentage,
                max_position_percentage,
                available_quote,
            ),
            time_of_day: cfg.session_multiplier(TradingSession::classify(Utc::now())),
        };

        let inputs = SizingInputs {
            symbol: params.symbol.clone(),
            direction: params.direction,
            equity: account.equity,
            entry_price,
            stop_loss_percentage,
            risk_percentage,
            max_position_percentage,
            available_quote,
            max_leverage: cfg.max_leverage,
            base_precision: instrument.base_precision,
            quote_precision: instrument.quote_precision,
        };

        Ok(self.calculator.compute(&inputs, factors)?)
    }

    async fn volatility_factor(
        &self,
        cfg: &SizerConfig,
        params: &PositionSizingParams,
    ) -> Decimal {
        if let Some(multiplier) = params.volatility_adjustment {
            return multiplier;
        }
        let class = match self
            .volatility
            .historical_volatility(&params.symbol, VOLATILITY_WINDOW_DAYS)
            .await
        {
            Ok(sigma) => VolatilityClass::classify(sigma),
            Err(err) => {
                warn!(symbol = %params.symbol, error = %err,
                    "volatility classification failed, defaulting to MEDIUM");
                VolatilityClass::Medium
            }
        };
        cfg.volatility_multiplier(class)
    }

    async fn market_cap_factor(
        &self,
        cfg: &SizerConfig,
        params: &PositionSizingParams,
    ) -> Decimal {
        if let Some(multiplier) = params.market_cap_adjustment {
            return multiplier;
        }
        let class = match self.market_data.market_cap(&params.symbol).await {
            Ok(cap) => MarketCapClass::classify(cap),
            Err(err) => {
                warn!(symbol = %params.symbol, error = %err,
                    "market-cap classification failed, defaulting to MID");
                MarketCapClass::Mid
            }
        };
        cfg.market_cap_multiplier(class)
    }

    /// Concentration multiplier from the projected share of this symbol's
    /// base asset, assuming the capped planned quote is added on top of
    /// the current portfolio.
    #[allow(clippy::too_many_arguments)]
    fn concentration_factor(
        &self,
        cfg: &SizerConfig,
        account: &AccountSnapshot,
        symbol: &str,
        entry_price: Decimal,
        risk_percentage: Decimal,
        stop_loss_percentage: Decimal,
        max_position_percentage: Decimal,
        available_quote: Decimal,
    ) -> Decimal {
        let price_risk = entry_price * stop_loss_percentage / HUNDRED;
        if price_risk.is_zero() || account.equity <= Decimal::ZERO {
            return Decimal::ONE;
        }

        // Mirror of the pipeline's pre-adjustment caps.
        let raw_quote = account.equity * risk_percentage / HUNDRED / price_risk * entry_price;
        let ceiling = account.equity * max_position_percentage / HUNDRED;
        let planned_quote = raw_quote.min(ceiling).min(available_quote);

        let asset = base_asset(symbol);
        let existing: Decimal = account
            .positions
            .values()
            .filter(|p| base_asset(&p.symbol) == asset)
            .map(|p| p.absolute_notional())
            .sum();
        let portfolio = account.gross_exposure();

        let denominator = portfolio + planned_quote;
        if denominator.is_zero() {
            return Decimal::ONE;
        }
        let projected = (existing + planned_quote) / denominator;
        cfg.concentration_multiplier(projected)
    }
}
