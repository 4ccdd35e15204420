//! ConfigureClientHandler - create or overwrite a client's rules.

use crate::domain::admission::{RateLimitRule, RuleSpec};
use crate::domain::foundation::{ClientId, Timestamp};

use super::client_registry::ClientRegistry;
use super::errors::AdmissionError;
use super::lock_scope::ClientLockScope;
use super::rule_store::RuleStore;

/// Command to upsert rules for a client.
#[derive(Debug, Clone)]
pub struct ConfigureClientCommand {
    pub client_id: String,
    pub rules: Vec<RuleSpec>,
}

/// Result of a successful upsert.
#[derive(Debug, Clone)]
pub struct ConfigureClientResult {
    pub client_id: ClientId,
    /// True if the client did not exist before this call.
    pub client_created: bool,
    /// The rules as written, each with a full bucket.
    pub rules: Vec<RateLimitRule>,
}

/// Handler for rule upserts.
///
/// Every written rule is reset: `available_permits = max_permits` and the
/// refill instant is now. Consumption is never carried over from the rule
/// being replaced. An unknown client is created first; an empty rule list
/// only ensures the client exists.
#[derive(Debug, Clone)]
pub struct ConfigureClientHandler {
    lock: ClientLockScope,
    registry: ClientRegistry,
    store: RuleStore,
}

impl ConfigureClientHandler {
    pub fn new(lock: ClientLockScope, registry: ClientRegistry, store: RuleStore) -> Self {
        Self { lock, registry, store }
    }

    pub async fn handle(&self, cmd: ConfigureClientCommand) -> Result<ConfigureClientResult, AdmissionError> {
        let client_id = ClientId::new(cmd.client_id)?;
        let specs = cmd.rules;

        self.lock
            .run(&client_id, || self.configure_locked(&client_id, specs))
            .await
    }

    async fn configure_locked(
        &self,
        client_id: &ClientId,
        specs: Vec<RuleSpec>,
    ) -> Result<ConfigureClientResult, AdmissionError> {
        // Validate every spec before the first write
        let now = Timestamp::now();
        let rules = specs
            .into_iter()
            .map(|spec| spec.into_rule(client_id.clone(), now))
            .collect::<Result<Vec<_>, _>>()?;

        let client_created = !self.registry.exists(client_id).await?;
        if client_created {
            self.registry.add(client_id).await?;
        }

        self.store.put_all(&rules).await?;
        tracing::info!("Configured {} rules for client {}", rules.len(), client_id);

        Ok(ConfigureClientResult {
            client_id: client_id.clone(),
            client_created,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRuleCache;
    use crate::adapters::lock::InMemoryClientLock;
    use crate::adapters::storage::{InMemoryClientRepository, InMemoryRuleRepository};
    use crate::domain::admission::{LimitTier, RefillUnit, RuleKey};
    use crate::domain::foundation::ValidationError;
    use crate::ports::{ClientRepository, RuleRepository};
    use std::sync::Arc;

    struct Fixture {
        handler: ConfigureClientHandler,
        repo: InMemoryRuleRepository,
        clients: InMemoryClientRepository,
    }

    fn fixture() -> Fixture {
        let repo = InMemoryRuleRepository::new();
        let clients = InMemoryClientRepository::new();
        let scope = ClientLockScope::new(Arc::new(InMemoryClientLock::new()), None);
        let store = RuleStore::new(Arc::new(repo.clone()), Arc::new(InMemoryRuleCache::new()));
        let registry = ClientRegistry::new(Arc::new(clients.clone()), store.clone(), scope.clone());
        Fixture {
            handler: ConfigureClientHandler::new(scope, registry, store),
            repo,
            clients,
        }
    }

    fn command(rules: Vec<RuleSpec>) -> ConfigureClientCommand {
        ConfigureClientCommand {
            client_id: "acme".to_string(),
            rules,
        }
    }

    fn spec(tier: LimitTier, scope: &str, max: u32) -> RuleSpec {
        RuleSpec::new(tier, scope, RefillUnit::Min, max).unwrap()
    }

    #[tokio::test]
    async fn creates_client_and_rules() {
        let f = fixture();

        let result = f
            .handler
            .handle(command(vec![
                spec(LimitTier::Default, "GLOBAL", 100),
                spec(LimitTier::Api, "/orders", 5),
            ]))
            .await
            .unwrap();

        assert!(result.client_created);
        assert_eq!(result.rules.len(), 2);
        assert!(f.clients.exists(&result.client_id).await.unwrap());
        assert_eq!(f.repo.len().await, 2);
    }

    #[tokio::test]
    async fn empty_rule_list_only_ensures_client() {
        let f = fixture();

        let result = f.handler.handle(command(vec![])).await.unwrap();

        assert!(result.client_created);
        assert!(f.repo.is_empty().await);
        let again = f.handler.handle(command(vec![])).await.unwrap();
        assert!(!again.client_created);
    }

    #[tokio::test]
    async fn upsert_resets_consumption() {
        let f = fixture();
        let client = ClientId::new("acme").unwrap();
        f.clients.insert(&client).await.unwrap();
        let key = RuleKey::new(client, LimitTier::Api, "/orders").unwrap();
        let drained = RateLimitRule::restore(key.clone(), RefillUnit::Min, 5, 0.0, Timestamp::now()).unwrap();
        f.repo.save(&drained).await.unwrap();

        f.handler
            .handle(command(vec![spec(LimitTier::Api, "/orders", 5)]))
            .await
            .unwrap();

        let stored = f.repo.find(&key).await.unwrap().unwrap();
        assert_eq!(stored.available_permits(), 5.0);
        assert_eq!(f.repo.len().await, 1);
    }

    #[tokio::test]
    async fn invalid_scope_writes_nothing() {
        let f = fixture();

        let result = f
            .handler
            .handle(command(vec![
                spec(LimitTier::Api, "/ok", 5),
                spec(LimitTier::Default, "not-global", 5),
            ]))
            .await;

        assert!(matches!(
            result,
            Err(AdmissionError::InvalidArgument(ValidationError::InvalidFormat { .. }))
        ));
        assert!(f.repo.is_empty().await);
        assert!(f.clients.all().await.is_empty());
    }

    #[tokio::test]
    async fn blank_client_id_is_invalid() {
        let f = fixture();
        let mut cmd = command(vec![]);
        cmd.client_id = String::new();

        let result = f.handler.handle(cmd).await;
        assert!(matches!(result, Err(AdmissionError::InvalidArgument(_))));
    }
}
