//! Cache-aside access to rate limit rules.
//!
//! Reads go cache first and fall back to the durable store, repairing the
//! cache on a durable hit. Writes go to the durable store first, then the
//! cache. The two writes are not atomic: if the process dies between them
//! the cache keeps the older value until the key is overwritten, deleted
//! or evicted. Read-through repair on a miss is the only reconciliation.
//!
//! Enumeration is always served by the durable store.

use std::sync::Arc;

use crate::domain::admission::{RateLimitRule, RuleKey};
use crate::domain::foundation::ClientId;
use crate::ports::{RuleCache, RuleRepository, StoreError};

use super::errors::AdmissionError;

/// Rule storage with a cache in front of the system of record.
#[derive(Clone)]
pub struct RuleStore {
    repository: Arc<dyn RuleRepository>,
    cache: Arc<dyn RuleCache>,
}

impl RuleStore {
    pub fn new(repository: Arc<dyn RuleRepository>, cache: Arc<dyn RuleCache>) -> Self {
        Self { repository, cache }
    }

    /// Point lookup: cache, then durable store.
    pub async fn get(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, AdmissionError> {
        match self.cache.get(key).await {
            Ok(Some(rule)) => {
                tracing::debug!("Cache hit for rule: {}", key);
                return Ok(Some(rule));
            }
            Ok(None) => {
                tracing::debug!("Cache miss for rule: {}", key);
            }
            // An undecodable entry is replaced from the durable store below.
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!("Discarding corrupt cache entry for rule {}: {}", key, reason);
            }
            Err(err) => {
                tracing::error!("Cache read failed for rule {}: {}", key, err);
                return Err(err.into());
            }
        }

        let found = self.repository.find(key).await?;
        if let Some(rule) = &found {
            self.cache.put(rule).await?;
        }
        Ok(found)
    }

    /// Write-through: durable store, then cache.
    pub async fn put(&self, rule: &RateLimitRule) -> Result<(), AdmissionError> {
        self.repository.save(rule).await?;
        self.cache.put(rule).await?;
        tracing::debug!("Persisted rule: {}", rule.key());
        Ok(())
    }

    /// Persists several rules, one at a time, in order.
    pub async fn put_all(&self, rules: &[RateLimitRule]) -> Result<(), AdmissionError> {
        for rule in rules {
            self.put(rule).await?;
        }
        Ok(())
    }

    /// Removes a rule from the durable store, then the cache.
    ///
    /// Returns false if the durable store held nothing under `key`; the cache
    /// entry is evicted either way.
    pub async fn delete(&self, key: &RuleKey) -> Result<bool, AdmissionError> {
        let removed = self.repository.delete(key).await?;
        self.cache.evict(key).await?;
        tracing::debug!("Deleted rule {} (existed: {})", key, removed);
        Ok(removed)
    }

    pub async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<RateLimitRule>, AdmissionError> {
        Ok(self.repository.find_by_client(client_id).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<RateLimitRule>, AdmissionError> {
        Ok(self.repository.list_all().await?)
    }

    /// Loads every durable rule into the cache. Returns how many were cached.
    pub async fn warm(&self) -> Result<usize, AdmissionError> {
        let rules = self.repository.list_all().await?;
        for rule in &rules {
            self.cache.put(rule).await?;
        }
        tracing::info!("Rule cache warmed with {} rules", rules.len());
        Ok(rules.len())
    }
}

impl std::fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRuleCache;
    use crate::adapters::storage::InMemoryRuleRepository;
    use crate::domain::admission::{LimitTier, RefillUnit};
    use crate::domain::foundation::Timestamp;
    use async_trait::async_trait;

    fn acme() -> ClientId {
        ClientId::new("acme").unwrap()
    }

    fn rule(scope: &str, max: u32) -> RateLimitRule {
        RateLimitRule::new(
            RuleKey::new(acme(), LimitTier::Api, scope).unwrap(),
            RefillUnit::Min,
            max,
            Timestamp::from_unix_millis(1_000),
        )
    }

    fn store() -> (RuleStore, InMemoryRuleRepository, InMemoryRuleCache) {
        let repo = InMemoryRuleRepository::new();
        let cache = InMemoryRuleCache::new();
        let store = RuleStore::new(Arc::new(repo.clone()), Arc::new(cache.clone()));
        (store, repo, cache)
    }

    #[tokio::test]
    async fn put_writes_both_layers() {
        let (store, repo, cache) = store();
        let r = rule("/orders", 5);

        store.put(&r).await.unwrap();

        assert_eq!(repo.find(r.key()).await.unwrap(), Some(r.clone()));
        assert_eq!(cache.get(r.key()).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn miss_reads_through_and_repairs_cache() {
        let (store, repo, cache) = store();
        let r = rule("/orders", 5);
        repo.save(&r).await.unwrap();
        assert!(cache.is_empty().await);

        assert_eq!(store.get(r.key()).await.unwrap(), Some(r.clone()));
        assert_eq!(cache.get(r.key()).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn cache_hit_skips_durable_store() {
        let (store, repo, cache) = store();
        let r = rule("/orders", 5);
        cache.put(&r).await.unwrap();
        repo.set_unavailable(true);

        assert_eq!(store.get(r.key()).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn absent_everywhere_is_none() {
        let (store, _repo, cache) = store();
        let key = RuleKey::default_for(acme());

        assert!(store.get(&key).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn durable_failure_is_store_unavailable() {
        let (store, repo, _cache) = store();
        repo.set_unavailable(true);

        let result = store.put(&rule("/orders", 5)).await;
        assert!(matches!(result, Err(AdmissionError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn failed_durable_write_leaves_cache_untouched() {
        let (store, repo, cache) = store();
        repo.set_unavailable(true);

        let _ = store.put(&rule("/orders", 5)).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn delete_removes_from_both_layers() {
        let (store, repo, cache) = store();
        let r = rule("/orders", 5);
        store.put(&r).await.unwrap();

        assert!(store.delete(r.key()).await.unwrap());
        assert!(repo.is_empty().await);
        assert!(cache.is_empty().await);
        assert!(!store.delete(r.key()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_evicts_stale_cache_entry_even_if_durable_missing() {
        let (store, _repo, cache) = store();
        let r = rule("/orders", 5);
        cache.put(&r).await.unwrap();

        assert!(!store.delete(r.key()).await.unwrap());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn enumeration_ignores_cache_only_entries() {
        let (store, repo, cache) = store();
        let durable = rule("/orders", 5);
        repo.save(&durable).await.unwrap();
        cache.put(&rule("/cached-only", 1)).await.unwrap();

        assert_eq!(store.list_by_client(&acme()).await.unwrap(), vec![durable.clone()]);
        assert_eq!(store.list_all().await.unwrap(), vec![durable]);
    }

    #[tokio::test]
    async fn warm_copies_every_durable_rule() {
        let (store, repo, cache) = store();
        repo.save(&rule("/a", 1)).await.unwrap();
        repo.save(&rule("/b", 2)).await.unwrap();

        assert_eq!(store.warm().await.unwrap(), 2);
        assert_eq!(cache.len().await, 2);
    }

    // ─── Corrupt cache entries ───

    struct CorruptCache;

    #[async_trait]
    impl RuleCache for CorruptCache {
        async fn get(&self, _key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError> {
            Err(StoreError::Corrupt("not json".to_string()))
        }

        async fn put(&self, _rule: &RateLimitRule) -> Result<(), StoreError> {
            Ok(())
        }

        async fn evict(&self, _key: &RuleKey) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn corrupt_cache_entry_falls_back_to_durable_store() {
        let repo = InMemoryRuleRepository::new();
        let r = rule("/orders", 5);
        repo.save(&r).await.unwrap();
        let store = RuleStore::new(Arc::new(repo), Arc::new(CorruptCache));

        assert_eq!(store.get(r.key()).await.unwrap(), Some(r));
    }
}
