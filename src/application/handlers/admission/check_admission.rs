//! CheckAdmissionHandler - decides whether one request may proceed.
//!
//! The whole check runs under the client's lock, acquired before the
//! client's existence is even looked at:
//!
//! ```text
//! validate ─▶ lock ─▶ client known? ─no─▶ auto-provision? ─no─▶ Denied(NotConfigured)
//!                          │ yes                 │ yes
//!                          ▼                     ▼
//!                     resolve rules ◀──── seed DEFAULT rule
//!                          │
//!                  none ─▶ Denied(NoLimitsConfigured)
//!                          │
//!                  refill + decide ─▶ Allowed (persist all) | Denied (persist nothing)
//! ```
//!
//! The lock is released on every path.

use crate::domain::admission::{
    refill_and_decide, AdmissionOutcome, BucketDecision, DenyReason, RateLimitRule, RefillUnit,
    RuleKey,
};
use crate::domain::foundation::{ClientId, Timestamp};

use super::client_registry::ClientRegistry;
use super::errors::AdmissionError;
use super::lock_scope::ClientLockScope;
use super::rule_resolver::RuleResolver;
use super::rule_store::RuleStore;

/// Command to check one incoming request.
#[derive(Debug, Clone)]
pub struct CheckAdmissionCommand {
    pub client_id: String,
    /// Request method, e.g. `GET`. Blank skips the METHOD tier.
    pub method_id: String,
    /// API endpoint. Blank skips the API tier.
    pub api_id: String,
}

/// Behaviour toward clients seen for the first time.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Create unknown clients with a seed DEFAULT rule instead of denying.
    pub auto_provision: bool,
    /// Capacity of the seed rule.
    pub seed_max_permits: u32,
    /// Refill unit of the seed rule.
    pub seed_time_unit: RefillUnit,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            auto_provision: false,
            seed_max_permits: 10,
            seed_time_unit: RefillUnit::Sec,
        }
    }
}

/// Handler for admission checks.
#[derive(Debug, Clone)]
pub struct CheckAdmissionHandler {
    lock: ClientLockScope,
    registry: ClientRegistry,
    resolver: RuleResolver,
    store: RuleStore,
    config: AdmissionConfig,
}

impl CheckAdmissionHandler {
    pub fn new(
        lock: ClientLockScope,
        registry: ClientRegistry,
        store: RuleStore,
        config: AdmissionConfig,
    ) -> Self {
        Self {
            lock,
            registry,
            resolver: RuleResolver::new(store.clone()),
            store,
            config,
        }
    }

    pub async fn handle(&self, cmd: CheckAdmissionCommand) -> Result<AdmissionOutcome, AdmissionError> {
        // 1. Validate before touching any lock
        let client_id = ClientId::new(cmd.client_id)?;

        // 2-6. Everything else happens inside the critical section
        self.lock
            .run(&client_id, || self.check_locked(&client_id, &cmd.method_id, &cmd.api_id))
            .await
    }

    async fn check_locked(
        &self,
        client_id: &ClientId,
        method_id: &str,
        api_id: &str,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        if !self.registry.exists(client_id).await? {
            if !self.config.auto_provision {
                tracing::warn!("Client not configured and auto-provisioning disabled: {}", client_id);
                return Ok(AdmissionOutcome::Denied(DenyReason::NotConfigured));
            }
            self.provision(client_id).await?;
        }

        let mut rules = self.resolver.resolve(client_id, method_id, api_id).await?;
        if rules.is_empty() {
            tracing::warn!(
                "No rate limits configured for client {} (method '{}', api '{}')",
                client_id,
                method_id,
                api_id
            );
            return Ok(AdmissionOutcome::Denied(DenyReason::NoLimitsConfigured));
        }

        match refill_and_decide(&mut rules, Timestamp::now()) {
            BucketDecision::Admitted(balances) => {
                self.store.put_all(&rules).await?;
                tracing::debug!("Request admitted for client {} across {} rules", client_id, rules.len());
                Ok(AdmissionOutcome::Allowed(balances))
            }
            BucketDecision::Exhausted { key, available } => {
                tracing::warn!("Rate limit reached for {} ({:.3} permits available)", key, available);
                Ok(AdmissionOutcome::Denied(DenyReason::RateLimitExceeded { key, available }))
            }
        }
    }

    async fn provision(&self, client_id: &ClientId) -> Result<(), AdmissionError> {
        self.registry.add(client_id).await?;

        let seed = RateLimitRule::new(
            RuleKey::default_for(client_id.clone()),
            self.config.seed_time_unit,
            self.config.seed_max_permits,
            Timestamp::now(),
        );
        self.store.put(&seed).await?;

        tracing::info!(
            "Auto-provisioned client {} with {} permits per {}",
            client_id,
            self.config.seed_max_permits,
            self.config.seed_time_unit
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRuleCache;
    use crate::adapters::storage::{InMemoryClientRepository, InMemoryRuleRepository};
    use crate::domain::admission::LimitTier;
    use crate::domain::foundation::ValidationError;
    use crate::ports::{ClientLock, ClientRepository, LockError, LockToken, RuleRepository};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Lock that never blocks but counts every acquire and release.
    #[derive(Default)]
    struct CountingLock {
        acquired: AtomicUsize,
        released: AtomicUsize,
    }

    impl CountingLock {
        fn balanced(&self) -> bool {
            self.acquired.load(Ordering::SeqCst) == self.released.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClientLock for CountingLock {
        async fn acquire(&self, client_id: &ClientId, _wait: Option<Duration>) -> Result<LockToken, LockError> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(LockToken::new(client_id.clone()))
        }

        async fn release(&self, _token: LockToken) -> Result<(), LockError> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Fixture {
        handler: CheckAdmissionHandler,
        repo: InMemoryRuleRepository,
        clients: InMemoryClientRepository,
        lock: Arc<CountingLock>,
    }

    fn fixture(config: AdmissionConfig) -> Fixture {
        let repo = InMemoryRuleRepository::new();
        let clients = InMemoryClientRepository::new();
        let lock = Arc::new(CountingLock::default());
        let scope = ClientLockScope::new(lock.clone(), None);
        let store = RuleStore::new(Arc::new(repo.clone()), Arc::new(InMemoryRuleCache::new()));
        let registry = ClientRegistry::new(Arc::new(clients.clone()), store.clone(), scope.clone());
        Fixture {
            handler: CheckAdmissionHandler::new(scope, registry, store, config),
            repo,
            clients,
            lock,
        }
    }

    fn acme() -> ClientId {
        ClientId::new("acme").unwrap()
    }

    fn check(method: &str, api: &str) -> CheckAdmissionCommand {
        CheckAdmissionCommand {
            client_id: "acme".to_string(),
            method_id: method.to_string(),
            api_id: api.to_string(),
        }
    }

    async fn seed(f: &Fixture, tier: LimitTier, scope: &str, unit: RefillUnit, max: u32, available: f64, at: Timestamp) -> RateLimitRule {
        f.clients.insert(&acme()).await.unwrap();
        let key = RuleKey::new(acme(), tier, scope).unwrap();
        let rule = RateLimitRule::restore(key, unit, max, available, at).unwrap();
        f.repo.save(&rule).await.unwrap();
        rule
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn blank_client_is_rejected_before_locking() {
        let f = fixture(AdmissionConfig::default());
        let mut cmd = check("GET", "/x");
        cmd.client_id = "   ".to_string();

        let result = f.handler.handle(cmd).await;

        assert!(matches!(
            result,
            Err(AdmissionError::InvalidArgument(ValidationError::EmptyField { .. }))
        ));
        assert_eq!(f.lock.acquired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_client_without_auto_provision_is_not_configured() {
        let f = fixture(AdmissionConfig::default());

        let outcome = f.handler.handle(check("GET", "/x")).await.unwrap();

        assert_eq!(outcome, AdmissionOutcome::Denied(DenyReason::NotConfigured));
        assert!(!f.clients.exists(&acme()).await.unwrap());
        assert!(f.repo.is_empty().await);
        assert!(f.lock.balanced());
    }

    #[tokio::test]
    async fn unknown_client_is_auto_provisioned_with_seed_rule() {
        let f = fixture(AdmissionConfig {
            auto_provision: true,
            ..Default::default()
        });

        let outcome = f.handler.handle(check("GET", "/x")).await.unwrap();

        assert!(outcome.is_allowed());
        assert!(f.clients.exists(&acme()).await.unwrap());
        let seeded = f.repo.find(&RuleKey::default_for(acme())).await.unwrap().unwrap();
        assert_eq!(seeded.max_permits(), 10);
        assert_eq!(seeded.time_unit(), RefillUnit::Sec);
        assert!(seeded.available_permits() >= 9.0 && seeded.available_permits() < 10.0);
    }

    #[tokio::test]
    async fn known_client_without_matching_rules_is_denied() {
        let f = fixture(AdmissionConfig::default());
        seed(&f, LimitTier::Method, "POST", RefillUnit::Sec, 5, 5.0, Timestamp::now()).await;

        let outcome = f.handler.handle(check("GET", "/x")).await.unwrap();

        assert_eq!(outcome, AdmissionOutcome::Denied(DenyReason::NoLimitsConfigured));
    }

    #[tokio::test]
    async fn refill_from_empty_after_half_a_unit() {
        let f = fixture(AdmissionConfig::default());
        let half_second_ago = Timestamp::now().minus_millis(500);
        seed(&f, LimitTier::Default, "GLOBAL", RefillUnit::Sec, 10, 0.0, half_second_ago).await;

        let outcome = f.handler.handle(check("GET", "/x")).await.unwrap();

        match outcome {
            AdmissionOutcome::Allowed(balances) => {
                assert_eq!(balances.len(), 1);
                assert!(balances[0].remaining >= 4.0 && balances[0].remaining < 5.0);
            }
            other => panic!("expected allowed, got {:?}", other),
        }
        let stored = f.repo.find(&RuleKey::default_for(acme())).await.unwrap().unwrap();
        assert!(stored.last_refill_at() > half_second_ago);
    }

    #[tokio::test]
    async fn exhausted_api_tier_denies_despite_default_headroom() {
        let f = fixture(AdmissionConfig::default());
        let now = Timestamp::now();
        let default = seed(&f, LimitTier::Default, "GLOBAL", RefillUnit::Sec, 5, 5.0, now).await;
        let api = seed(&f, LimitTier::Api, "/orders", RefillUnit::Day, 1, 0.0, now).await;

        let outcome = f.handler.handle(check("GET", "/orders")).await.unwrap();

        match outcome.deny_reason() {
            Some(DenyReason::RateLimitExceeded { key, .. }) => assert_eq!(key, api.key()),
            other => panic!("expected rate limit, got {:?}", other),
        }
        // Nothing was debited or touched
        assert_eq!(f.repo.find(default.key()).await.unwrap(), Some(default));
        assert_eq!(f.repo.find(api.key()).await.unwrap(), Some(api));
    }

    #[tokio::test]
    async fn allowed_check_debits_every_resolved_rule() {
        let f = fixture(AdmissionConfig::default());
        let now = Timestamp::now();
        let default = seed(&f, LimitTier::Default, "GLOBAL", RefillUnit::Hour, 5, 5.0, now).await;
        let method = seed(&f, LimitTier::Method, "GET", RefillUnit::Hour, 3, 3.0, now).await;

        let outcome = f.handler.handle(check("GET", "/x")).await.unwrap();
        assert!(outcome.is_allowed());

        let d = f.repo.find(default.key()).await.unwrap().unwrap();
        let m = f.repo.find(method.key()).await.unwrap().unwrap();
        assert!((d.available_permits() - 4.0).abs() < 0.01);
        assert!((m.available_permits() - 2.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn store_failure_surfaces_and_releases_lock() {
        let f = fixture(AdmissionConfig::default());
        seed(&f, LimitTier::Default, "GLOBAL", RefillUnit::Sec, 5, 5.0, Timestamp::now()).await;
        f.repo.set_unavailable(true);

        let result = f.handler.handle(check("GET", "/x")).await;

        assert!(matches!(result, Err(AdmissionError::StoreUnavailable(_))));
        assert!(f.lock.balanced());
    }
}
