//! Subscriber tasks wiring the bus into the engine
//!
//! Each topic gets a long-running task that drains its channel and calls
//! into the engine. Handlers catch and log every error; a failing event
//! must never take its task down. Tasks end when their channel closes or
//! the shutdown signal flips, whichever comes first.

use crate::bus::{rejection_event, EventBus};
use crate::events::{
    AccountUpdated, LimitsUpdated, OrderCreated, PositionUpdated, ProfileUpdated,
};
use custodia::{RiskError, RiskEvaluationEngine};
use mensura::{SizerConfig, SizerConfigHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

/// The spawned subscriber tasks, held for scoped shutdown.
pub struct HandlerSet {
    tasks: Vec<JoinHandle<()>>,
}

impl HandlerSet {
    /// Subscribe to every inbound topic and spawn one task per topic.
    /// Subscriptions are taken before any task runs, so events published
    /// after this call are never missed.
    pub fn spawn(
        engine: Arc<RiskEvaluationEngine>,
        sizer_config: SizerConfigHandle,
        bus: &Arc<EventBus>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let orders = bus.subscribe_order_created();
        let positions = bus.subscribe_position_updated();
        let accounts = bus.subscribe_account_updated();
        let profiles = bus.subscribe_profile_updated();
        let limits = bus.subscribe_limits_updated();
        let configs = bus.subscribe_sizing_config();

        let tasks = vec![
            tokio::spawn(order_handler(
                engine.clone(),
                bus.clone(),
                orders,
                shutdown.clone(),
            )),
            tokio::spawn(position_handler(engine.clone(), positions, shutdown.clone())),
            tokio::spawn(account_handler(engine.clone(), accounts, shutdown.clone())),
            tokio::spawn(profile_handler(engine.clone(), profiles, shutdown.clone())),
            tokio::spawn(limits_handler(engine, limits, shutdown.clone())),
            tokio::spawn(config_handler(sizer_config, configs, shutdown)),
        ];

        Self { tasks }
    }

    /// Await every task for up to `grace` in total, then abort the
    /// stragglers.
    pub async fn shutdown(self, grace: Duration) {
        let mut tasks = self.tasks;
        if timeout(grace, futures::future::join_all(tasks.iter_mut()))
            .await
            .is_err()
        {
            warn!("subscriber tasks outlived the grace window, aborting");
            for task in &tasks {
                task.abort();
            }
        }
    }
}

/// Drain a channel into `handle` until closure or shutdown. Lag is logged
/// and skipped.
async fn drain<T, F, Fut>(
    mut rx: broadcast::Receiver<T>,
    mut shutdown: watch::Receiver<bool>,
    topic: &'static str,
    mut handle: F,
) where
    T: Clone,
    F: FnMut(T) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(event) => handle(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(topic, skipped, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

async fn order_handler(
    engine: Arc<RiskEvaluationEngine>,
    bus: Arc<EventBus>,
    rx: broadcast::Receiver<OrderCreated>,
    shutdown: watch::Receiver<bool>,
) {
    drain(rx, shutdown, "order:created", |event: OrderCreated| {
        let engine = engine.clone();
        let bus = bus.clone();
        async move {
            match engine
                .check_order_risk(&event.account_id, &event.user_id, &event.order)
                .await
            {
                // The engine publishes violations and actions itself; the
                // evaluation here is for the caller's benefit only.
                Ok(_) => {}
                Err(RiskError::EvaluationTimeout { deadline }) => {
                    // A blown deadline on the submission path is a refusal.
                    warn!(account_id = %event.account_id, symbol = %event.order.symbol,
                        ?deadline, "order evaluation timed out, treating as rejection");
                    bus.publish_risk_action(rejection_event(
                        &event.account_id,
                        &event.order.symbol,
                    ));
                }
                Err(err) => {
                    warn!(account_id = %event.account_id, symbol = %event.order.symbol,
                        error = %err, "order evaluation failed");
                }
            }
        }
    })
    .await;
}

async fn position_handler(
    engine: Arc<RiskEvaluationEngine>,
    rx: broadcast::Receiver<PositionUpdated>,
    shutdown: watch::Receiver<bool>,
) {
    drain(rx, shutdown, "position:updated", |event: PositionUpdated| {
        let engine = engine.clone();
        async move {
            if let Err(err) = engine
                .check_position_risk(&event.account_id, &event.symbol)
                .await
            {
                warn!(account_id = %event.account_id, symbol = %event.symbol,
                    error = %err, "position re-evaluation failed");
            }
        }
    })
    .await;
}

async fn account_handler(
    engine: Arc<RiskEvaluationEngine>,
    rx: broadcast::Receiver<AccountUpdated>,
    shutdown: watch::Receiver<bool>,
) {
    drain(rx, shutdown, "account:updated", |event: AccountUpdated| {
        let engine = engine.clone();
        async move {
            if let Err(err) = engine.observe_account(&event.account_id).await {
                warn!(account_id = %event.account_id, error = %err,
                    "account observation failed");
            }
        }
    })
    .await;
}

async fn profile_handler(
    engine: Arc<RiskEvaluationEngine>,
    rx: broadcast::Receiver<ProfileUpdated>,
    shutdown: watch::Receiver<bool>,
) {
    drain(rx, shutdown, "risk:profile_updated", |event: ProfileUpdated| {
        let engine = engine.clone();
        async move {
            info!(profile_id = %event.profile.id, "applying profile update");
            engine.update_risk_profile(event.profile).await;
        }
    })
    .await;
}

async fn limits_handler(
    engine: Arc<RiskEvaluationEngine>,
    rx: broadcast::Receiver<LimitsUpdated>,
    shutdown: watch::Receiver<bool>,
) {
    drain(rx, shutdown, "risk:limits_updated", |event: LimitsUpdated| {
        let engine = engine.clone();
        async move {
            info!(account_id = %event.account_id, "applying account limit update");
            engine
                .update_account_limits(&event.account_id, event.limits)
                .await;
        }
    })
    .await;
}

async fn config_handler(
    handle: SizerConfigHandle,
    rx: broadcast::Receiver<SizerConfig>,
    shutdown: watch::Receiver<bool>,
) {
    drain(rx, shutdown, "config:position-sizing", |config: SizerConfig| {
        let handle = handle.clone();
        async move {
            info!("applying sizer configuration reload");
            handle.store(config);
        }
    })
    .await;
}
