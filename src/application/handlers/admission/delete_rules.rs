//! DeleteRulesHandler - remove selected rules of a client.

use crate::domain::admission::{RuleKey, RuleSelector};
use crate::domain::foundation::{ClientId, ValidationError};

use super::errors::AdmissionError;
use super::lock_scope::ClientLockScope;
use super::rule_store::RuleStore;

/// Command to delete rules by `(tier, scope)`.
#[derive(Debug, Clone)]
pub struct DeleteRulesCommand {
    pub client_id: String,
    pub selectors: Vec<RuleSelector>,
}

/// Result of a delete that matched at least one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRulesResult {
    pub removed: usize,
}

/// Handler for rule deletion.
///
/// Succeeds if at least one selector matched; fails with `RuleNotFound`
/// if none did.
#[derive(Debug, Clone)]
pub struct DeleteRulesHandler {
    lock: ClientLockScope,
    store: RuleStore,
}

impl DeleteRulesHandler {
    pub fn new(lock: ClientLockScope, store: RuleStore) -> Self {
        Self { lock, store }
    }

    pub async fn handle(&self, cmd: DeleteRulesCommand) -> Result<DeleteRulesResult, AdmissionError> {
        let client_id = ClientId::new(cmd.client_id)?;
        if cmd.selectors.is_empty() {
            return Err(ValidationError::empty_field("limits").into());
        }
        let keys = cmd
            .selectors
            .iter()
            .map(|selector| selector.key_for(client_id.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        self.lock
            .run(&client_id, || self.delete_locked(&client_id, &keys))
            .await
    }

    async fn delete_locked(
        &self,
        client_id: &ClientId,
        keys: &[RuleKey],
    ) -> Result<DeleteRulesResult, AdmissionError> {
        let mut removed = 0;
        for key in keys {
            if self.store.delete(key).await? {
                removed += 1;
            }
        }

        if removed == 0 {
            return Err(AdmissionError::RuleNotFound(format!(
                "no matching rate limits for client '{}'",
                client_id
            )));
        }

        tracing::info!("Deleted {} rules for client {}", removed, client_id);
        Ok(DeleteRulesResult { removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryRuleCache;
    use crate::adapters::lock::InMemoryClientLock;
    use crate::adapters::storage::InMemoryRuleRepository;
    use crate::domain::admission::{LimitTier, RateLimitRule, RefillUnit};
    use crate::domain::foundation::Timestamp;
    use std::sync::Arc;

    async fn handler_with_rule() -> (DeleteRulesHandler, InMemoryRuleRepository) {
        let repo = InMemoryRuleRepository::new();
        let store = RuleStore::new(Arc::new(repo.clone()), Arc::new(InMemoryRuleCache::new()));
        let key = RuleKey::new(ClientId::new("acme").unwrap(), LimitTier::Method, "GET").unwrap();
        store
            .put(&RateLimitRule::new(key, RefillUnit::Sec, 2, Timestamp::now()))
            .await
            .unwrap();
        let scope = ClientLockScope::new(Arc::new(InMemoryClientLock::new()), None);
        (DeleteRulesHandler::new(scope, store), repo)
    }

    fn command(selectors: Vec<RuleSelector>) -> DeleteRulesCommand {
        DeleteRulesCommand {
            client_id: "acme".to_string(),
            selectors,
        }
    }

    #[tokio::test]
    async fn empty_selector_list_is_invalid() {
        let (handler, repo) = handler_with_rule().await;

        let result = handler.handle(command(vec![])).await;

        assert!(matches!(result, Err(AdmissionError::InvalidArgument(_))));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn no_match_is_not_found() {
        let (handler, _repo) = handler_with_rule().await;

        let result = handler
            .handle(command(vec![RuleSelector::new(LimitTier::Method, "POST")]))
            .await;

        assert!(matches!(result, Err(AdmissionError::RuleNotFound(_))));
    }

    #[tokio::test]
    async fn partial_match_succeeds_and_counts() {
        let (handler, repo) = handler_with_rule().await;

        let result = handler
            .handle(command(vec![
                RuleSelector::new(LimitTier::Method, "GET"),
                RuleSelector::new(LimitTier::Api, "/missing"),
            ]))
            .await
            .unwrap();

        assert_eq!(result, DeleteRulesResult { removed: 1 });
        assert!(repo.is_empty().await);
    }
}
