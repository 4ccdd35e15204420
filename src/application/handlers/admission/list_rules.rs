//! Rule enumeration queries. Always served by the durable store.

use crate::domain::admission::RateLimitRule;
use crate::domain::foundation::ClientId;

use super::errors::AdmissionError;
use super::rule_store::RuleStore;

/// Query for the rules of one client.
#[derive(Debug, Clone)]
pub struct ListClientRulesQuery {
    pub client_id: String,
}

/// Handler listing every rule of every client.
#[derive(Debug, Clone)]
pub struct ListAllRulesHandler {
    store: RuleStore,
}

impl ListAllRulesHandler {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<RateLimitRule>, AdmissionError> {
        self.store.list_all().await
    }
}

/// Handler listing one client's rules. An unknown client has none.
#[derive(Debug, Clone)]
pub struct ListClientRulesHandler {
    store: RuleStore,
}

impl ListClientRulesHandler {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListClientRulesQuery) -> Result<Vec<RateLimitRule>, AdmissionError> {
        let client_id = ClientId::new(query.client_id)?;
        self.store.list_by_client(&client_id).await
    }
}
