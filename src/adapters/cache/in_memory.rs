//! In-memory rule cache for testing and single-node deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::admission::{RateLimitRule, RuleKey};
use crate::ports::{RuleCache, StoreError};

/// Process-local rule cache.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleCache {
    entries: Arc<RwLock<HashMap<RuleKey, RateLimitRule>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRuleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, as a cache eviction storm would.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of cached rules.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Simulate an outage: every call fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory cache offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RuleCache for InMemoryRuleCache {
    async fn get(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError> {
        self.check_available()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, rule: &RateLimitRule) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries
            .write()
            .await
            .insert(rule.key().clone(), rule.clone());
        Ok(())
    }

    async fn evict(&self, key: &RuleKey) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::admission::RefillUnit;
    use crate::domain::foundation::{ClientId, Timestamp};

    fn rule() -> RateLimitRule {
        let key = RuleKey::default_for(ClientId::new("acme").unwrap());
        RateLimitRule::new(key, RefillUnit::Sec, 10, Timestamp::now())
    }

    #[tokio::test]
    async fn put_get_evict_cycle() {
        let cache = InMemoryRuleCache::new();
        let r = rule();

        assert_eq!(cache.get(r.key()).await.unwrap(), None);
        cache.put(&r).await.unwrap();
        assert_eq!(cache.get(r.key()).await.unwrap(), Some(r.clone()));

        cache.evict(r.key()).await.unwrap();
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn evicting_missing_entry_is_ok() {
        let cache = InMemoryRuleCache::new();
        assert!(cache.evict(rule().key()).await.is_ok());
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = InMemoryRuleCache::new();
        cache.put(&rule()).await.unwrap();
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
