//! In-Memory Rule Repository Adapter
//!
//! Keeps rules in a map keyed by [`RuleKey`]. Useful for tests, development,
//! and single-node deployments that accept losing state on restart.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::admission::{RateLimitRule, RuleKey};
use crate::domain::foundation::ClientId;
use crate::ports::{RuleRepository, StoreError};

/// In-memory durable-store stand-in.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleRepository {
    rules: Arc<RwLock<BTreeMap<RuleKey, RateLimitRule>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRuleRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored rules
    pub async fn len(&self) -> usize {
        self.rules.read().await.len()
    }

    /// True when no rules are stored
    pub async fn is_empty(&self) -> bool {
        self.rules.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory rule repository offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn find(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError> {
        self.check_available()?;
        Ok(self.rules.read().await.get(key).cloned())
    }

    async fn save(&self, rule: &RateLimitRule) -> Result<(), StoreError> {
        self.check_available()?;
        self.rules
            .write()
            .await
            .insert(rule.key().clone(), rule.clone());
        Ok(())
    }

    async fn delete(&self, key: &RuleKey) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.rules.write().await.remove(key).is_some())
    }

    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<RateLimitRule>, StoreError> {
        self.check_available()?;
        Ok(self
            .rules
            .read()
            .await
            .values()
            .filter(|rule| rule.client_id() == client_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<RateLimitRule>, StoreError> {
        self.check_available()?;
        Ok(self.rules.read().await.values().cloned().collect())
    }
}
