//! Action resolution
//!
//! Folds a list of verdicts into the single action the engine enforces:
//!
//! 1. any `Reject` verdict dominates;
//! 2. otherwise any `ReduceOnly` verdict holds only against orders that
//!    grow absolute exposure, and demotes to `Warn` against the rest;
//! 3. otherwise the strongest remaining action wins, `Notify` when the
//!    list is empty.

use crate::types::{Action, Verdict};

/// Resolve the enforcement action for one evaluation pass.
///
/// `increases_exposure` reports whether the evaluated order grows absolute
/// exposure on its symbol; the monitor path, having no order to soften
/// for, passes `true`.
pub fn resolve(verdicts: &[Verdict], increases_exposure: bool) -> Action {
    if verdicts.iter().any(|v| v.action == Action::Reject) {
        return Action::Reject;
    }
    if verdicts.iter().any(|v| v.action == Action::ReduceOnly) {
        return if increases_exposure {
            Action::ReduceOnly
        } else {
            Action::Warn
        };
    }
    verdicts
        .iter()
        .map(|v| v.action)
        .max()
        .unwrap_or(Action::Notify)
}

/// Whether a resolved action admits the evaluated order.
///
/// `ReduceOnly` only survives resolution against exposure-growing orders,
/// so it always refuses; reducing orders arrive here already demoted.
pub fn admits(resolved: Action) -> bool {
    !matches!(resolved, Action::Reject | Action::ReduceOnly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LimitKind;
    use rust_decimal::Decimal;

    fn verdict(action: Action) -> Verdict {
        Verdict::new(
            LimitKind::OrderSize,
            action,
            Decimal::ONE,
            Decimal::ZERO,
            "test",
        )
    }

    #[test]
    fn empty_list_is_notify() {
        assert_eq!(resolve(&[], true), Action::Notify);
        assert!(admits(Action::Notify));
    }

    #[test]
    fn reject_dominates_everything() {
        let verdicts = vec![
            verdict(Action::Warn),
            verdict(Action::ReduceOnly),
            verdict(Action::Reject),
        ];
        assert_eq!(resolve(&verdicts, false), Action::Reject);
        assert!(!admits(Action::Reject));
    }

    #[test]
    fn reduce_only_holds_against_increasing_orders() {
        let verdicts = vec![verdict(Action::Warn), verdict(Action::ReduceOnly)];
        assert_eq!(resolve(&verdicts, true), Action::ReduceOnly);
        assert!(!admits(Action::ReduceOnly));
    }

    #[test]
    fn reduce_only_demotes_for_reducing_orders() {
        let verdicts = vec![verdict(Action::ReduceOnly)];
        assert_eq!(resolve(&verdicts, false), Action::Warn);
        assert!(admits(Action::Warn));
    }

    #[test]
    fn strongest_remaining_action_wins() {
        let verdicts = vec![verdict(Action::Notify), verdict(Action::Warn)];
        assert_eq!(resolve(&verdicts, true), Action::Warn);

        let verdicts = vec![verdict(Action::Notify)];
        assert_eq!(resolve(&verdicts, true), Action::Notify);
    }

    #[test]
    fn adding_a_verdict_never_weakens_the_resolution() {
        let actions = [
            Action::Notify,
            Action::Warn,
            Action::ReduceOnly,
            Action::Reject,
        ];
        // Exhaustive over all pairs and both exposure directions.
        for increases in [true, false] {
            for base in actions {
                for extra in actions {
                    let before = resolve(&[verdict(base)], increases);
                    let after = resolve(&[verdict(base), verdict(extra)], increases);
                    assert!(
                        after >= before,
                        "adding {extra:?} to {base:?} weakened {before:?} to {after:?}"
                    );
                }
            }
        }
    }
}
