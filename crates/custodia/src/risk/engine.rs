//! The risk evaluation engine
//!
//! Orchestrates pre-trade and post-trade checks: resolves the account's
//! effective limits, runs every non-exempt evaluator, folds the verdicts
//! into one enforcement action, and reports violations through the event
//! sink. Evaluations for the same account are serialized behind that
//! account's session lock; different accounts evaluate in parallel.
//!
//! Profile and limit maps are copy-on-write: readers clone an `Arc` and
//! writers swap the whole entry, so a concurrent update can never be seen
//! half-applied.

use crate::repository::RiskRepository;
use crate::risk::context::EvalContext;
use crate::risk::evaluators;
use crate::risk::resolver;
use crate::risk::session::SessionStats;
use crate::types::{
    profiles, AccountRiskLimits, Action, EffectiveLimits, Evaluation, LimitKind, RiskProfile,
    Verdict,
};
use crate::RiskError;
use chrono::Utc;
use dashmap::DashMap;
use praesidium_types::{AccountService, MarketDataService, OrderIntent};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Profile assigned to accounts with no stored limits.
const FALLBACK_PROFILE: &str = profiles::MODERATE;

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline for the synchronous order-submission path.
    pub order_deadline: Duration,
    /// Deadline for monitor-driven position checks.
    pub monitor_deadline: Duration,
    /// Width of the rolling trade-frequency window.
    pub frequency_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_deadline: Duration::from_millis(100),
            monitor_deadline: Duration::from_secs(2),
            frequency_window: Duration::from_secs(60),
        }
    }
}

/// Outbound reporting seam.
///
/// Emission is fire-and-forget on the evaluation path; implementations
/// must not block.
pub trait RiskEventSink: Send + Sync {
    /// One breached limit worth reporting.
    fn violation(&self, account_id: &str, verdict: &Verdict);

    /// A resolved enforcement action of `Warn` or stronger.
    fn action(&self, account_id: &str, evaluation: &Evaluation);
}

/// Sink that drops every event; used by tests and standalone evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl RiskEventSink for NoopEventSink {
    fn violation(&self, _account_id: &str, _verdict: &Verdict) {}
    fn action(&self, _account_id: &str, _evaluation: &Evaluation) {}
}

/// The engine. Cheap to share behind an `Arc`; all interior state is
/// concurrent.
pub struct RiskEvaluationEngine {
    repository: Arc<dyn RiskRepository>,
    accounts: Arc<dyn AccountService>,
    market_data: Arc<dyn MarketDataService>,
    events: Arc<dyn RiskEventSink>,
    profiles: DashMap<String, Arc<RiskProfile>>,
    account_limits: DashMap<String, Arc<AccountRiskLimits>>,
    sessions: DashMap<String, Arc<Mutex<SessionStats>>>,
    config: EngineConfig,
}

impl RiskEvaluationEngine {
    pub fn new(
        repository: Arc<dyn RiskRepository>,
        accounts: Arc<dyn AccountService>,
        market_data: Arc<dyn MarketDataService>,
        events: Arc<dyn RiskEventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            accounts,
            market_data,
            events,
            profiles: DashMap::new(),
            account_limits: DashMap::new(),
            sessions: DashMap::new(),
            config,
        }
    }

    /// Load profiles from the repository, seeding the built-in tiers when
    /// the store is empty. Safe to call again after a restart; it
    /// converges to repository state.
    pub async fn initialize(&self) -> Result<(), RiskError> {
        let mut ids = self.repository.list_risk_profile_ids().await?;
        if ids.is_empty() {
            info!("profile store empty, seeding built-in profiles");
            for profile in profiles::builtin_profiles() {
                self.repository.save_risk_profile(&profile).await?;
                ids.push(profile.id.clone());
            }
        }
        for id in &ids {
            if let Some(profile) = self.repository.get_risk_profile(id).await? {
                self.profiles.insert(id.clone(), Arc::new(profile));
            }
        }
        info!(profiles = ids.len(), "risk engine initialized");
        Ok(())
    }

    /// Evaluate a prospective order. Limit breaches come back as data in
    /// the [`Evaluation`]; only missing identities, infrastructure
    /// failure, or the deadline raise.
    #[instrument(level = "debug", skip(self, order), fields(symbol = %order.symbol))]
    pub async fn check_order_risk(
        &self,
        account_id: &str,
        user_id: &str,
        order: &OrderIntent,
    ) -> Result<Evaluation, RiskError> {
        let deadline = self.config.order_deadline;
        timeout(
            deadline,
            self.evaluate(account_id, Some(order), &order.symbol, &LimitKind::ALL),
        )
        .await
        .map_err(|_| RiskError::EvaluationTimeout { deadline })?
    }

    /// Re-evaluate an existing position against the position-centric limit
    /// kinds. Driven by the monitor loop and position-update events.
    #[instrument(level = "debug", skip(self))]
    pub async fn check_position_risk(
        &self,
        account_id: &str,
        symbol: &str,
    ) -> Result<Evaluation, RiskError> {
        let deadline = self.config.monitor_deadline;
        timeout(
            deadline,
            self.evaluate(account_id, None, symbol, &LimitKind::POSITION_CENTRIC),
        )
        .await
        .map_err(|_| RiskError::EvaluationTimeout { deadline })?
    }

    /// Persist a profile, then swap the in-memory snapshot. A persistence
    /// failure is logged and the swap still happens, keeping the hot path
    /// correct; a background reconciler owns the retry.
    pub async fn update_risk_profile(&self, profile: RiskProfile) {
        if let Err(err) = self.repository.save_risk_profile(&profile).await {
            warn!(profile_id = %profile.id, error = %err,
                "profile persistence failed; in-memory snapshot updated anyway");
        }
        self.profiles
            .insert(profile.id.clone(), Arc::new(profile));
    }

    /// Persist per-account limits, then swap the in-memory snapshot.
    pub async fn update_account_limits(&self, account_id: &str, limits: AccountRiskLimits) {
        if let Err(err) = self.repository.save_account_limits(account_id, &limits).await {
            warn!(account_id, error = %err,
                "account limit persistence failed; in-memory snapshot updated anyway");
        }
        self.account_limits
            .insert(account_id.to_string(), Arc::new(limits));
    }

    /// Refresh the session's equity observations from the account service.
    /// Wired to account-update events so drawdown sees peaks that occur
    /// between orders.
    pub async fn observe_account(&self, account_id: &str) -> Result<(), RiskError> {
        let account = self.accounts.account_snapshot(account_id).await?;
        let session = self.session_handle(account_id);
        let mut session = session.lock().await;
        session.observe_equity(Utc::now(), account.equity);
        Ok(())
    }

    /// Fold a realized PnL delta into the account's session counters.
    pub async fn record_realized_pnl(&self, account_id: &str, delta: Decimal) {
        let session = self.session_handle(account_id);
        let mut session = session.lock().await;
        session.record_realized_pnl(Utc::now(), delta);
    }

    /// Resolved view of an account's limits, for admin surfaces.
    pub async fn effective_limits(&self, account_id: &str) -> Result<EffectiveLimits, RiskError> {
        self.resolve_limits(account_id).await
    }

    fn session_handle(&self, account_id: &str) -> Arc<Mutex<SessionStats>> {
        self.sessions
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionStats::new(Utc::now()))))
            .clone()
    }

    async fn resolve_limits(&self, account_id: &str) -> Result<EffectiveLimits, RiskError> {
        // Account limits are loaded lazily: the repository contract cannot
        // enumerate accounts, so first use pulls from storage and caches.
        let cached = self.account_limits.get(account_id).map(|e| e.value().clone());
        let overrides = match cached {
            Some(overrides) => Some(overrides),
            None => match self.repository.get_account_limits(account_id).await? {
                Some(limits) => {
                    let limits = Arc::new(limits);
                    self.account_limits
                        .insert(account_id.to_string(), limits.clone());
                    Some(limits)
                }
                None => None,
            },
        };

        let profile_id = overrides
            .as_ref()
            .map(|o| o.profile_id.clone())
            .unwrap_or_else(|| FALLBACK_PROFILE.to_string());

        let cached_profile = self.profiles.get(&profile_id).map(|e| e.value().clone());
        let profile = match cached_profile {
            Some(profile) => profile,
            None => match self.repository.get_risk_profile(&profile_id).await? {
                Some(profile) => {
                    let profile = Arc::new(profile);
                    self.profiles.insert(profile_id.clone(), profile.clone());
                    profile
                }
                None => return Err(RiskError::ProfileNotFound { profile_id }),
            },
        };

        Ok(EffectiveLimits::resolve(&profile, overrides.as_deref()))
    }

    async fn evaluate(
        &self,
        account_id: &str,
        order: Option<&OrderIntent>,
        symbol: &str,
        kinds: &[LimitKind],
    ) -> Result<Evaluation, RiskError> {
        // Serialize per account: holding the session lock for the whole
        // pass keeps counter updates and limit checks from interleaving.
        let session = self.session_handle(account_id);
        let mut session = session.lock().await;

        let account = self.accounts.account_snapshot(account_id).await?;
        let limits = self.resolve_limits(account_id).await?;
        let reference_price = self.market_data.reference_price(symbol).await?;

        let now = Utc::now();
        session.observe_equity(now, account.equity);
        let snapshot = session.snapshot(now, self.config.frequency_window);

        let ctx = EvalContext {
            account: &account,
            symbol,
            order,
            reference_price,
            session: snapshot,
        };

        let mut verdicts = Vec::new();
        for kind in kinds {
            if limits.is_exempt(*kind) {
                debug!(kind = %kind, "limit exempt, skipped");
                continue;
            }
            verdicts.extend(evaluators::evaluate(*kind, &limits, &ctx));
        }

        let resolved = resolver::resolve(&verdicts, ctx.increases_exposure());
        let allow = resolver::admits(resolved);
        let evaluation = Evaluation::new(account_id, symbol, verdicts, resolved, allow);

        for verdict in evaluation.reportable_verdicts() {
            self.events.violation(account_id, verdict);
        }
        if resolved >= Action::Warn {
            self.events.action(account_id, &evaluation);
        }

        if order.is_some() && allow {
            session.record_accepted_order(now);
        }

        if !allow {
            warn!(account_id, symbol, action = %resolved,
                verdicts = evaluation.verdicts.len(), "evaluation refused");
        } else if !evaluation.is_clean() {
            info!(account_id, symbol, action = %resolved,
                verdicts = evaluation.verdicts.len(), "evaluation passed with findings");
        }

        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryAccounts, InMemoryMarketData};
    use crate::repository::InMemoryRiskRepository;
    use praesidium_types::{AccountSnapshot, Balance};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    async fn engine_with_account(equity: Decimal) -> Arc<RiskEvaluationEngine> {
        let repository = Arc::new(InMemoryRiskRepository::new());
        let accounts = Arc::new(InMemoryAccounts::new());
        let market = Arc::new(InMemoryMarketData::new());

        let mut balances = HashMap::new();
        balances.insert("USD".to_string(), Balance::new(equity, Decimal::ZERO));
        accounts
            .upsert(AccountSnapshot {
                account_id: "acct-1".to_string(),
                equity,
                balances,
                positions: HashMap::new(),
            })
            .await;
        market.set_price("BTC-USD", dec!(50000)).await;

        let engine = Arc::new(RiskEvaluationEngine::new(
            repository,
            accounts,
            market,
            Arc::new(NoopEventSink),
            EngineConfig::default(),
        ));
        engine.initialize().await.unwrap();
        engine
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let repository = Arc::new(InMemoryRiskRepository::new());
        let engine = RiskEvaluationEngine::new(
            repository.clone(),
            Arc::new(InMemoryAccounts::new()),
            Arc::new(InMemoryMarketData::new()),
            Arc::new(NoopEventSink),
            EngineConfig::default(),
        );

        engine.initialize().await.unwrap();
        let first = repository.list_risk_profile_ids().await.unwrap();
        assert_eq!(first.len(), 4);

        engine.initialize().await.unwrap();
        let second = repository.list_risk_profile_ids().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_account_raises() {
        let engine = engine_with_account(dec!(100000)).await;
        let err = engine
            .check_position_risk("nobody", "BTC-USD")
            .await
            .unwrap_err();
        assert!(matches!(err, RiskError::AccountNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_profile_raises() {
        let engine = engine_with_account(dec!(100000)).await;
        engine
            .update_account_limits("acct-1", AccountRiskLimits::for_profile("missing"))
            .await;

        let err = engine
            .check_position_risk("acct-1", "BTC-USD")
            .await
            .unwrap_err();
        assert!(matches!(err, RiskError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_market_data_raises() {
        let engine = engine_with_account(dec!(100000)).await;
        let err = engine
            .check_position_risk("acct-1", "ETH-USD")
            .await
            .unwrap_err();
        assert!(matches!(err, RiskError::MarketDataUnavailable { .. }));
    }

    #[tokio::test]
    async fn profile_update_swaps_snapshot() {
        let engine = engine_with_account(dec!(100000)).await;

        let mut profile = profiles::moderate();
        profile.order_limits.max_order_size = dec!(42);
        engine.update_risk_profile(profile).await;

        let limits = engine.effective_limits("acct-1").await.unwrap();
        assert_eq!(limits.order_limits().max_order_size, dec!(42));
    }
}
