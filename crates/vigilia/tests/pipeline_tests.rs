//! Full-loop integration: events in, enforcement events out
//!
//! These tests run the real engine behind the bus with in-memory
//! collaborators, the way the bootstrap binary wires it.

use custodia::memory::{InMemoryAccounts, InMemoryMarketData};
use custodia::{
    AccountRiskLimits, Action, EngineConfig, InMemoryRiskRepository, LimitKind,
    RiskEvaluationEngine,
};
use mensura::{SizerConfig, SizerConfigHandle};
use praesidium_types::{
    AccountSnapshot, Balance, OrderIntent, OrderSide, OrderType, Position, PositionSide,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use vigilia::{EventBus, OrderCreated, RiskControlService, RiskMonitor};

struct Stack {
    bus: Arc<EventBus>,
    engine: Arc<RiskEvaluationEngine>,
    accounts: Arc<InMemoryAccounts>,
    sizer_config: SizerConfigHandle,
}

async fn stack() -> Stack {
    let repository = Arc::new(InMemoryRiskRepository::new());
    let accounts = Arc::new(InMemoryAccounts::new());
    let market = Arc::new(InMemoryMarketData::new());
    let bus = Arc::new(EventBus::new());

    market.set_price("BTC-USD", dec!(50000)).await;

    let engine = Arc::new(RiskEvaluationEngine::new(
        repository,
        accounts.clone(),
        market,
        bus.clone(),
        EngineConfig::default(),
    ));
    engine.initialize().await.unwrap();

    Stack {
        bus,
        engine,
        accounts,
        sizer_config: SizerConfigHandle::default(),
    }
}

fn flat_account(account_id: &str, equity: Decimal) -> AccountSnapshot {
    let mut balances = HashMap::new();
    balances.insert("USD".to_string(), Balance::new(equity, Decimal::ZERO));
    AccountSnapshot {
        account_id: account_id.to_string(),
        equity,
        balances,
        positions: HashMap::new(),
    }
}

fn service(s: &Stack, period: Duration) -> RiskControlService {
    let monitor = RiskMonitor::new(
        s.engine.clone(),
        s.accounts.clone(),
        s.accounts.clone(),
        period,
    );
    RiskControlService::start(s.engine.clone(), s.sizer_config.clone(), &s.bus, monitor)
}

#[tokio::test]
async fn order_event_produces_enforcement_events() {
    let s = stack().await;
    s.accounts.upsert(flat_account("acct-1", dec!(100000))).await;
    s.engine
        .update_account_limits("acct-1", AccountRiskLimits::for_profile("conservative"))
        .await;

    let mut violations = s.bus.subscribe_risk_violation();
    let mut actions = s.bus.subscribe_risk_action();
    let svc = service(&s, Duration::from_secs(60));

    s.bus.publish_order_created(OrderCreated {
        account_id: "acct-1".to_string(),
        user_id: "user-1".to_string(),
        order: OrderIntent {
            symbol: "BTC-USD".to_string(),
            side: OrderSide::Buy,
            size: dec!(6),
            price: None,
            order_type: OrderType::Market,
        },
    });

    let violation = timeout(Duration::from_secs(2), violations.recv())
        .await
        .expect("no violation within deadline")
        .unwrap();
    assert_eq!(violation.account_id, "acct-1");
    assert!(violation.verdict.action > Action::Notify);

    let action = timeout(Duration::from_secs(2), actions.recv())
        .await
        .expect("no action within deadline")
        .unwrap();
    assert_eq!(action.resolved_action, Action::Reject);
    assert!(action
        .verdicts
        .iter()
        .any(|v| v.kind == LimitKind::PositionSize));

    svc.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn monitor_sweep_reports_breached_positions() {
    let s = stack().await;
    s.engine
        .update_account_limits("acct-2", AccountRiskLimits::for_profile("moderate"))
        .await;

    // Peak at 100k, then a drawdown past the moderate 30% ceiling with an
    // open position for the monitor to find.
    s.accounts.upsert(flat_account("acct-2", dec!(100000))).await;
    s.engine.observe_account("acct-2").await.unwrap();

    let mut drawn_down = flat_account("acct-2", dec!(65000));
    drawn_down.positions.insert(
        "BTC-USD".to_string(),
        Position {
            symbol: "BTC-USD".to_string(),
            side: PositionSide::Long,
            size: dec!(1),
            notional_value: dec!(50000),
            entry_price: dec!(50000),
            unrealized_pnl: Decimal::ZERO,
        },
    );
    s.accounts.upsert(drawn_down).await;

    let mut actions = s.bus.subscribe_risk_action();
    let svc = service(&s, Duration::from_millis(50));

    let action = timeout(Duration::from_secs(2), actions.recv())
        .await
        .expect("monitor produced no action")
        .unwrap();
    assert_eq!(action.account_id, "acct-2");
    assert_eq!(action.resolved_action, Action::ReduceOnly);
    assert!(action.verdicts.iter().any(|v| v.kind == LimitKind::Drawdown));

    svc.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn sizing_config_reload_swaps_the_snapshot() {
    let s = stack().await;
    let svc = service(&s, Duration::from_secs(60));

    assert_eq!(s.sizer_config.load().default_risk_percentage, dec!(1));

    let mut reloaded = SizerConfig::default();
    reloaded.default_risk_percentage = dec!(0.5);
    s.bus.publish_sizing_config(reloaded);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if s.sizer_config.load().default_risk_percentage == dec!(0.5) {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "config reload never applied"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    svc.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn handler_survives_bad_events() {
    let s = stack().await;
    s.accounts.upsert(flat_account("acct-3", dec!(100000))).await;

    let mut actions = s.bus.subscribe_risk_action();
    let svc = service(&s, Duration::from_secs(60));

    // Unknown account: the handler logs and keeps consuming.
    s.bus.publish_order_created(OrderCreated {
        account_id: "ghost".to_string(),
        user_id: "user-x".to_string(),
        order: OrderIntent {
            symbol: "BTC-USD".to_string(),
            side: OrderSide::Buy,
            size: dec!(1),
            price: None,
            order_type: OrderType::Market,
        },
    });

    // A subsequent oversized order still gets evaluated and enforced.
    s.bus.publish_order_created(OrderCreated {
        account_id: "acct-3".to_string(),
        user_id: "user-3".to_string(),
        order: OrderIntent {
            symbol: "BTC-USD".to_string(),
            side: OrderSide::Buy,
            size: dec!(100),
            price: None,
            order_type: OrderType::Market,
        },
    });

    let action = timeout(Duration::from_secs(2), actions.recv())
        .await
        .expect("handler died on the bad event")
        .unwrap();
    assert_eq!(action.account_id, "acct-3");

    svc.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn shutdown_completes_within_the_grace_window() {
    let s = stack().await;
    let svc = service(&s, Duration::from_millis(50));

    // Give the monitor a tick, then insist teardown is prompt.
    tokio::time::sleep(Duration::from_millis(120)).await;
    timeout(Duration::from_secs(3), svc.shutdown(Duration::from_secs(1)))
        .await
        .expect("shutdown exceeded its grace window");
}
