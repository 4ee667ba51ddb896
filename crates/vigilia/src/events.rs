//! Event payloads carried on the bus

use custodia::{AccountRiskLimits, Action, Evaluation, RiskProfile, Verdict};
use praesidium_types::OrderIntent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A new order awaiting pre-trade evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub account_id: String,
    pub user_id: String,
    pub order: OrderIntent,
}

/// A position changed; its account should be re-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdated {
    pub account_id: String,
    pub symbol: String,
}

/// Account state changed; equity observations should refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdated {
    pub account_id: String,
}

/// An administrator published a new or revised profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdated {
    pub profile: RiskProfile,
}

/// An administrator changed one account's limit overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsUpdated {
    pub account_id: String,
    pub limits: AccountRiskLimits,
}

/// One breached limit, published per reportable verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskViolationEvent {
    pub account_id: String,
    pub verdict: Verdict,
}

/// A resolved enforcement action of `Warn` or stronger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskActionEvent {
    pub account_id: String,
    pub evaluation_id: Uuid,
    pub symbol: String,
    pub resolved_action: Action,
    pub verdicts: Vec<Verdict>,
}

impl RiskActionEvent {
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self {
            account_id: evaluation.account_id.clone(),
            evaluation_id: evaluation.id,
            symbol: evaluation.symbol.clone(),
            resolved_action: evaluation.resolved_action,
            verdicts: evaluation.verdicts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia::LimitKind;
    use rust_decimal_macros::dec;

    #[test]
    fn action_event_mirrors_the_evaluation() {
        let evaluation = Evaluation::new(
            "acct-1",
            "BTC-USD",
            vec![Verdict::new(
                LimitKind::OrderSize,
                Action::Warn,
                dec!(25),
                dec!(20),
                "order size 25 exceeds limit 20",
            )],
            Action::Warn,
            true,
        );

        let event = RiskActionEvent::from_evaluation(&evaluation);
        assert_eq!(event.account_id, "acct-1");
        assert_eq!(event.evaluation_id, evaluation.id);
        assert_eq!(event.resolved_action, Action::Warn);
        assert_eq!(event.verdicts.len(), 1);
    }

    #[test]
    fn payloads_roundtrip_through_json() {
        let event = PositionUpdated {
            account_id: "acct-1".to_string(),
            symbol: "ETH-USD".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PositionUpdated = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
