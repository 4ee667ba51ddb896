//! Verdicts and evaluations
//!
//! A [`Verdict`] is one limit's finding; an [`Evaluation`] composes every
//! verdict from a pass over an account with the single resolved action and
//! the final admit/refuse decision.

use crate::types::limits::{Action, LimitKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One limit's finding against an account or order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: LimitKind,
    /// Action configured for this kind on the account's effective profile.
    pub action: Action,
    /// Value observed during evaluation.
    pub observed: Decimal,
    /// Threshold the observed value exceeded.
    pub threshold: Decimal,
    pub message: String,
}

impl Verdict {
    pub fn new(
        kind: LimitKind,
        action: Action,
        observed: Decimal,
        threshold: Decimal,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            action,
            observed,
            threshold,
            message: message.into(),
        }
    }

    /// Amount by which the observation exceeds the threshold.
    pub fn excess(&self) -> Decimal {
        if self.observed > self.threshold {
            self.observed - self.threshold
        } else {
            Decimal::ZERO
        }
    }
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub account_id: String,
    pub symbol: String,
    /// Every verdict found, preserved for reporting regardless of the
    /// resolved action.
    pub verdicts: Vec<Verdict>,
    pub resolved_action: Action,
    /// Whether the evaluated order (or, on the monitor path, new exposure)
    /// is admitted.
    pub allow: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn new(
        account_id: impl Into<String>,
        symbol: impl Into<String>,
        verdicts: Vec<Verdict>,
        resolved_action: Action,
        allow: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            symbol: symbol.into(),
            verdicts,
            resolved_action,
            allow,
            evaluated_at: Utc::now(),
        }
    }

    /// First verdict of a given kind, if any.
    pub fn verdict_for(&self, kind: LimitKind) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.kind == kind)
    }

    /// Verdicts that warrant reporting on the violation topic.
    pub fn reportable_verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.action > Action::Notify)
    }

    pub fn is_clean(&self) -> bool {
        self.verdicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn verdict_excess() {
        let verdict = Verdict::new(
            LimitKind::OrderSize,
            Action::Warn,
            dec!(25),
            dec!(20),
            "order size 25 exceeds limit 20",
        );
        assert_eq!(verdict.excess(), dec!(5));

        let under = Verdict::new(LimitKind::OrderSize, Action::Warn, dec!(10), dec!(20), "");
        assert_eq!(under.excess(), Decimal::ZERO);
    }

    #[test]
    fn reportable_skips_notify() {
        let evaluation = Evaluation::new(
            "acct-1",
            "BTC-USD",
            vec![
                Verdict::new(LimitKind::Concentration, Action::Notify, dec!(0.3), dec!(0.2), ""),
                Verdict::new(LimitKind::OrderSize, Action::Warn, dec!(25), dec!(20), ""),
            ],
            Action::Warn,
            true,
        );

        let reportable: Vec<_> = evaluation.reportable_verdicts().collect();
        assert_eq!(reportable.len(), 1);
        assert_eq!(reportable[0].kind, LimitKind::OrderSize);
        assert!(evaluation.verdict_for(LimitKind::Concentration).is_some());
        assert!(!evaluation.is_clean());
    }
}
