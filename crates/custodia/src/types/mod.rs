//! Value types of the risk core: limits, profiles, overrides, verdicts.

pub mod limits;
pub mod overrides;
pub mod profiles;
pub mod verdict;

pub use limits::{
    Action, ActionPolicy, LimitKind, MarginLimits, OrderLimits, PositionLimits, RiskLimits,
    RiskProfile, DEFAULT_POSITION_LIMITS,
};
pub use overrides::{
    AccountRiskLimits, EffectiveLimits, MarginLimitsOverride, OrderLimitsOverride,
    PositionLimitsOverride, RiskLimitsOverride,
};
pub use verdict::{Evaluation, Verdict};
