//! Selection of the rules that apply to one request.

use crate::domain::admission::{LimitTier, RateLimitRule, RuleKey};
use crate::domain::foundation::ClientId;

use super::errors::AdmissionError;
use super::rule_store::RuleStore;

/// Looks up the `DEFAULT`, `METHOD` and `API` rules for a request.
///
/// Every rule found is enforced; a missing tier is skipped, never created.
#[derive(Debug, Clone)]
pub struct RuleResolver {
    store: RuleStore,
}

impl RuleResolver {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    /// Returns at most three rules, in tier order.
    ///
    /// A blank `method_id` or `api_id` skips that tier.
    pub async fn resolve(
        &self,
        client_id: &ClientId,
        method_id: &str,
        api_id: &str,
    ) -> Result<Vec<RateLimitRule>, AdmissionError> {
        let mut rules = Vec::with_capacity(LimitTier::ALL.len());

        for key in Self::candidate_keys(client_id, method_id, api_id) {
            if let Some(rule) = self.store.get(&key).await? {
                rules.push(rule);
            }
        }

        Ok(rules)
    }

    fn candidate_keys(client_id: &ClientId, method_id: &str, api_id: &str) -> Vec<RuleKey> {
        let mut keys = vec![RuleKey::default_for(client_id.clone())];
        for (tier, scope) in [(LimitTier::Method, method_id), (LimitTier::Api, api_id)] {
            if let Ok(key) = RuleKey::new(client_id.clone(), tier, scope) {
                keys.push(key);
            }
        }
        keys
    }
}
