//! Persistence contract for profiles and per-account limits
//!
//! Implementations may be SQL, key-value, or file backed; each call is
//! atomic on its own. The engine treats write failures as soft: the hot
//! path keeps its in-memory state and a background reconciler owns the
//! retry.

use crate::types::{AccountRiskLimits, RiskProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Repository failure, opaque to the engine beyond its description.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("repository operation failed: {reason}")]
    Failed { reason: String },
}

impl RepositoryError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Storage for risk profiles and per-account limit overrides.
#[async_trait]
pub trait RiskRepository: Send + Sync {
    async fn get_risk_profile(&self, id: &str) -> Result<Option<RiskProfile>, RepositoryError>;

    async fn save_risk_profile(&self, profile: &RiskProfile) -> Result<(), RepositoryError>;

    async fn list_risk_profile_ids(&self) -> Result<Vec<String>, RepositoryError>;

    async fn get_account_limits(
        &self,
        account_id: &str,
    ) -> Result<Option<AccountRiskLimits>, RepositoryError>;

    async fn save_account_limits(
        &self,
        account_id: &str,
        limits: &AccountRiskLimits,
    ) -> Result<(), RepositoryError>;
}

/// Map-backed repository used by the bootstrap binary and the tests.
#[derive(Debug, Default)]
pub struct InMemoryRiskRepository {
    profiles: RwLock<HashMap<String, RiskProfile>>,
    account_limits: RwLock<HashMap<String, AccountRiskLimits>>,
}

impl InMemoryRiskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RiskRepository for InMemoryRiskRepository {
    async fn get_risk_profile(&self, id: &str) -> Result<Option<RiskProfile>, RepositoryError> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn save_risk_profile(&self, profile: &RiskProfile) -> Result<(), RepositoryError> {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn list_risk_profile_ids(&self) -> Result<Vec<String>, RepositoryError> {
        let mut ids: Vec<String> = self.profiles.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_account_limits(
        &self,
        account_id: &str,
    ) -> Result<Option<AccountRiskLimits>, RepositoryError> {
        Ok(self.account_limits.read().await.get(account_id).cloned())
    }

    async fn save_account_limits(
        &self,
        account_id: &str,
        limits: &AccountRiskLimits,
    ) -> Result<(), RepositoryError> {
        self.account_limits
            .write()
            .await
            .insert(account_id.to_string(), limits.clone());
        Ok(())
    }
}
