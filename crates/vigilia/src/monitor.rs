//! Periodic position-risk monitor
//!
//! Sweeps every account holding open positions and re-runs the
//! position-centric checks per symbol. One account's failure never stops
//! the sweep; the engine publishes any enforcement events itself.

use custodia::RiskEvaluationEngine;
use praesidium_types::{AccountService, PositionService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default sweep period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

pub struct RiskMonitor {
    engine: Arc<RiskEvaluationEngine>,
    accounts: Arc<dyn AccountService>,
    positions: Arc<dyn PositionService>,
    period: Duration,
}

impl RiskMonitor {
    pub fn new(
        engine: Arc<RiskEvaluationEngine>,
        accounts: Arc<dyn AccountService>,
        positions: Arc<dyn PositionService>,
        period: Duration,
    ) -> Self {
        Self {
            engine,
            accounts,
            positions,
            period,
        }
    }

    /// One full pass over every account with open positions.
    pub async fn sweep_once(&self) {
        let account_ids = match self.accounts.active_account_ids().await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "monitor could not list accounts, skipping sweep");
                return;
            }
        };

        for account_id in account_ids {
            if let Err(err) = self.sweep_account(&account_id).await {
                // Isolation between accounts: log and move on.
                warn!(account_id = %account_id, error = %err, "account sweep failed");
            }
        }
    }

    async fn sweep_account(&self, account_id: &str) -> Result<(), custodia::RiskError> {
        let positions = self.positions.open_positions(account_id).await?;
        if positions.is_empty() {
            return Ok(());
        }

        for position in positions {
            match self
                .engine
                .check_position_risk(account_id, &position.symbol)
                .await
            {
                Ok(evaluation) => {
                    debug!(account_id, symbol = %position.symbol,
                        action = %evaluation.resolved_action, "position checked");
                }
                Err(custodia::RiskError::EvaluationTimeout { deadline }) => {
                    // Monitor-path timeouts are a logged skip, not a refusal.
                    warn!(account_id, symbol = %position.symbol, ?deadline,
                        "position check timed out, skipped");
                }
                Err(err) => {
                    warn!(account_id, symbol = %position.symbol, error = %err,
                        "position check failed");
                }
            }
        }
        Ok(())
    }

    /// Run sweeps on the configured period until the shutdown signal
    /// flips. The first tick fires immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period = ?self.period, "risk monitor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep_once().await,
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown too.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("risk monitor stopped");
    }
}
