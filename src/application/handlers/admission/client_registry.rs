//! Onboarded clients and cascade removal.

use std::sync::Arc;

use crate::domain::foundation::ClientId;
use crate::ports::ClientRepository;

use super::errors::AdmissionError;
use super::lock_scope::ClientLockScope;
use super::rule_store::RuleStore;

/// Tracks which clients exist.
///
/// `exists` and `add` expect the caller to already hold the client's lock;
/// `remove` takes the lock itself.
#[derive(Clone)]
pub struct ClientRegistry {
    clients: Arc<dyn ClientRepository>,
    rules: RuleStore,
    lock: ClientLockScope,
}

impl ClientRegistry {
    pub fn new(clients: Arc<dyn ClientRepository>, rules: RuleStore, lock: ClientLockScope) -> Self {
        Self { clients, rules, lock }
    }

    pub async fn exists(&self, client_id: &ClientId) -> Result<bool, AdmissionError> {
        Ok(self.clients.exists(client_id).await?)
    }

    /// Creates the client record, failing with `Conflict` if it exists.
    pub async fn add(&self, client_id: &ClientId) -> Result<(), AdmissionError> {
        if !self.clients.insert(client_id).await? {
            return Err(AdmissionError::conflict(client_id));
        }
        tracing::info!("Client added: {}", client_id);
        Ok(())
    }

    /// Deletes every rule of the client, then the client itself.
    ///
    /// Runs under the client's lock so no check observes a half-removed client.
    pub async fn remove(&self, client_id: &ClientId) -> Result<usize, AdmissionError> {
        self.lock
            .run(client_id, || self.remove_locked(client_id))
            .await
    }

    async fn remove_locked(&self, client_id: &ClientId) -> Result<usize, AdmissionError> {
        if !self.clients.exists(client_id).await? {
            return Err(AdmissionError::client_not_found(client_id));
        }

        let rules = self.rules.list_by_client(client_id).await?;
        for rule in &rules {
            self.rules.delete(rule.key()).await?;
        }
        self.clients.delete(client_id).await?;

        tracing::info!("Client removed: {} ({} rules deleted)", client_id, rules.len());
        Ok(rules.len())
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRuleCache;
    use crate::adapters::lock::InMemoryClientLock;
    use crate::adapters::storage::{InMemoryClientRepository, InMemoryRuleRepository};
    use crate::domain::admission::{LimitTier, RateLimitRule, RefillUnit, RuleKey};
    use crate::domain::foundation::Timestamp;
    use crate::ports::{ClientLock, RuleCache, RuleRepository};
    use std::time::Duration;

    struct Fixture {
        registry: ClientRegistry,
        store: RuleStore,
        repo: InMemoryRuleRepository,
        cache: InMemoryRuleCache,
        lock: InMemoryClientLock,
    }

    fn fixture() -> Fixture {
        let repo = InMemoryRuleRepository::new();
        let cache = InMemoryRuleCache::new();
        let lock = InMemoryClientLock::new();
        let store = RuleStore::new(Arc::new(repo.clone()), Arc::new(cache.clone()));
        let registry = ClientRegistry::new(
            Arc::new(InMemoryClientRepository::new()),
            store.clone(),
            ClientLockScope::new(Arc::new(lock.clone()), Some(Duration::from_millis(50))),
        );
        Fixture {
            registry,
            store,
            repo,
            cache,
            lock,
        }
    }

    fn acme() -> ClientId {
        ClientId::new("acme").unwrap()
    }

    #[tokio::test]
    async fn add_then_exists() {
        let f = fixture();
        assert!(!f.registry.exists(&acme()).await.unwrap());

        f.registry.add(&acme()).await.unwrap();
        assert!(f.registry.exists(&acme()).await.unwrap());
    }

    #[tokio::test]
    async fn add_twice_conflicts() {
        let f = fixture();
        f.registry.add(&acme()).await.unwrap();

        let result = f.registry.add(&acme()).await;
        assert!(matches!(result, Err(AdmissionError::Conflict { .. })));
    }

    #[tokio::test]
    async fn remove_unknown_client_is_not_found() {
        let f = fixture();
        let result = f.registry.remove(&acme()).await;

        assert!(matches!(result, Err(AdmissionError::ClientNotFound { .. })));
        assert!(!f.lock.is_held(&acme()).await);
    }

    #[tokio::test]
    async fn remove_cascades_to_rules_in_both_layers() {
        let f = fixture();
        f.registry.add(&acme()).await.unwrap();
        let now = Timestamp::now();
        for scope in ["/a", "/b"] {
            let key = RuleKey::new(acme(), LimitTier::Api, scope).unwrap();
            f.store.put(&RateLimitRule::new(key, RefillUnit::Sec, 3, now)).await.unwrap();
        }
        let other = ClientId::new("globex").unwrap();
        f.store
            .put(&RateLimitRule::new(RuleKey::default_for(other.clone()), RefillUnit::Sec, 3, now))
            .await
            .unwrap();

        assert_eq!(f.registry.remove(&acme()).await.unwrap(), 2);

        assert!(!f.registry.exists(&acme()).await.unwrap());
        assert!(f.repo.find_by_client(&acme()).await.unwrap().is_empty());
        let a = RuleKey::new(acme(), LimitTier::Api, "/a").unwrap();
        assert!(f.cache.get(&a).await.unwrap().is_none());
        assert_eq!(f.repo.len().await, 1);
        assert!(!f.lock.is_held(&acme()).await);
    }

    #[tokio::test]
    async fn remove_waits_for_the_client_lock() {
        let f = fixture();
        f.registry.add(&acme()).await.unwrap();
        let held = f.lock.acquire(&acme(), None).await.unwrap();

        let result = f.registry.remove(&acme()).await;
        assert!(matches!(result, Err(AdmissionError::LockTimeout { .. })));
        assert!(f.registry.exists(&acme()).await.unwrap());

        f.lock.release(held).await.unwrap();
    }
}
