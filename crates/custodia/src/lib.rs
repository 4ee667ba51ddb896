//! Custodia - Risk Evaluation Core
//!
//! Gates order acceptance and watches open positions against layered,
//! per-account risk envelopes:
//!
//! - **Limit model** ([`types`]): profiles bundling position, order,
//!   margin, and portfolio limits with a graded action per limit kind,
//!   plus a sparse per-account override layer.
//! - **Evaluators** ([`risk::evaluators`]): one pure function per limit
//!   kind, fed by an immutable evaluation context.
//! - **Engine** ([`risk::engine`]): per-account serialized evaluation with
//!   deadlines, copy-on-write limit maps, session counters, and event
//!   emission through the [`risk::RiskEventSink`] seam.
//! - **Sizer** ([`sizing`]): the adaptive position sizer, reading account
//!   and market collaborators and delegating the arithmetic to `mensura`.
//!
//! Limit violations are data, not errors: an evaluation always returns,
//! and [`RiskError`] is reserved for missing identities, infrastructure
//! failure, and deadline overruns.

pub mod memory;
pub mod repository;
pub mod risk;
pub mod sizing;
pub mod types;

pub use repository::{InMemoryRiskRepository, RepositoryError, RiskRepository};
pub use risk::{EngineConfig, NoopEventSink, RiskEvaluationEngine, RiskEventSink};
pub use sizing::{AdaptivePositionSizer, PositionSizingParams};
pub use types::{
    AccountRiskLimits, Action, ActionPolicy, EffectiveLimits, Evaluation, LimitKind, RiskProfile,
    Verdict,
};

use mensura::SizingError;
use praesidium_types::ServiceError;
use std::time::Duration;
use thiserror::Error;

/// Failures of the risk core proper.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("risk profile not found: {profile_id}")]
    ProfileNotFound { profile_id: String },

    #[error("market data unavailable for {symbol}: {reason}")]
    MarketDataUnavailable { symbol: String, reason: String },

    #[error("sizing failed: {0}")]
    Sizing(#[from] SizingError),

    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),

    /// Order-path callers must treat this as a rejection; the monitor path
    /// logs and skips.
    #[error("evaluation exceeded its {deadline:?} deadline")]
    EvaluationTimeout { deadline: Duration },

    #[error("service unavailable: {reason}")]
    ServiceUnavailable { reason: String },
}

impl From<ServiceError> for RiskError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::AccountNotFound { account_id } => {
                RiskError::AccountNotFound { account_id }
            }
            ServiceError::MarketDataUnavailable { symbol, reason } => {
                RiskError::MarketDataUnavailable { symbol, reason }
            }
            ServiceError::Unavailable { reason } => RiskError::ServiceUnavailable { reason },
        }
    }
}

/// Result type for risk-core operations.
pub type Result<T> = std::result::Result<T, RiskError>;
