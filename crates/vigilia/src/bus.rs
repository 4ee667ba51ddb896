//! The typed event bus
//!
//! One broadcast channel per topic instead of a string-keyed emitter:
//! publishers and subscribers agree on payload types at compile time, and
//! closing a channel is the cancellation signal for its handler task.
//! Publishing to a topic nobody subscribes to is not an error; the event
//! is simply dropped.

use crate::events::{
    AccountUpdated, LimitsUpdated, OrderCreated, PositionUpdated, ProfileUpdated, RiskActionEvent,
    RiskViolationEvent,
};
use custodia::{Action, Evaluation, RiskEventSink, Verdict};
use mensura::SizerConfig;
use tokio::sync::broadcast;

/// Default per-topic buffer depth.
const DEFAULT_CAPACITY: usize = 256;

/// Typed channel per topic.
#[derive(Debug)]
pub struct EventBus {
    order_created: broadcast::Sender<OrderCreated>,
    position_updated: broadcast::Sender<PositionUpdated>,
    account_updated: broadcast::Sender<AccountUpdated>,
    profile_updated: broadcast::Sender<ProfileUpdated>,
    limits_updated: broadcast::Sender<LimitsUpdated>,
    sizing_config: broadcast::Sender<SizerConfig>,
    risk_violation: broadcast::Sender<RiskViolationEvent>,
    risk_action: broadcast::Sender<RiskActionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order_created: broadcast::channel(capacity).0,
            position_updated: broadcast::channel(capacity).0,
            account_updated: broadcast::channel(capacity).0,
            profile_updated: broadcast::channel(capacity).0,
            limits_updated: broadcast::channel(capacity).0,
            sizing_config: broadcast::channel(capacity).0,
            risk_violation: broadcast::channel(capacity).0,
            risk_action: broadcast::channel(capacity).0,
        }
    }

    pub fn publish_order_created(&self, event: OrderCreated) {
        let _ = self.order_created.send(event);
    }

    pub fn publish_position_updated(&self, event: PositionUpdated) {
        let _ = self.position_updated.send(event);
    }

    pub fn publish_account_updated(&self, event: AccountUpdated) {
        let _ = self.account_updated.send(event);
    }

    pub fn publish_profile_updated(&self, event: ProfileUpdated) {
        let _ = self.profile_updated.send(event);
    }

    pub fn publish_limits_updated(&self, event: LimitsUpdated) {
        let _ = self.limits_updated.send(event);
    }

    pub fn publish_sizing_config(&self, config: SizerConfig) {
        let _ = self.sizing_config.send(config);
    }

    pub fn publish_risk_action(&self, event: RiskActionEvent) {
        let _ = self.risk_action.send(event);
    }

    pub fn subscribe_order_created(&self) -> broadcast::Receiver<OrderCreated> {
        self.order_created.subscribe()
    }

    pub fn subscribe_position_updated(&self) -> broadcast::Receiver<PositionUpdated> {
        self.position_updated.subscribe()
    }

    pub fn subscribe_account_updated(&self) -> broadcast::Receiver<AccountUpdated> {
        self.account_updated.subscribe()
    }

    pub fn subscribe_profile_updated(&self) -> broadcast::Receiver<ProfileUpdated> {
        self.profile_updated.subscribe()
    }

    pub fn subscribe_limits_updated(&self) -> broadcast::Receiver<LimitsUpdated> {
        self.limits_updated.subscribe()
    }

    pub fn subscribe_sizing_config(&self) -> broadcast::Receiver<SizerConfig> {
        self.sizing_config.subscribe()
    }

    pub fn subscribe_risk_violation(&self) -> broadcast::Receiver<RiskViolationEvent> {
        self.risk_violation.subscribe()
    }

    pub fn subscribe_risk_action(&self) -> broadcast::Receiver<RiskActionEvent> {
        self.risk_action.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine reports through the bus: one violation event per reportable
/// verdict, one action event per enforced evaluation.
impl RiskEventSink for EventBus {
    fn violation(&self, account_id: &str, verdict: &Verdict) {
        let _ = self.risk_violation.send(RiskViolationEvent {
            account_id: account_id.to_string(),
            verdict: verdict.clone(),
        });
    }

    fn action(&self, _account_id: &str, evaluation: &Evaluation) {
        let _ = self
            .risk_action
            .send(RiskActionEvent::from_evaluation(evaluation));
    }
}

/// Convenience for handlers that synthesize a refusal without an
/// evaluation, e.g. on an order-path timeout.
pub fn rejection_event(account_id: &str, symbol: &str) -> RiskActionEvent {
    RiskActionEvent {
        account_id: account_id.to_string(),
        evaluation_id: uuid::Uuid::new_v4(),
        symbol: symbol.to_string(),
        resolved_action: Action::Reject,
        verdicts: Vec::new(),
    }
}
