//! Wiring of the admission components over a set of ports.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{ClientLock, ClientRepository, RuleCache, RuleRepository};

use super::add_client::AddClientHandler;
use super::check_admission::{AdmissionConfig, CheckAdmissionHandler};
use super::client_registry::ClientRegistry;
use super::configure_client::ConfigureClientHandler;
use super::delete_rules::DeleteRulesHandler;
use super::list_rules::{ListAllRulesHandler, ListClientRulesHandler};
use super::lock_scope::ClientLockScope;
use super::remove_client::RemoveClientHandler;
use super::rule_store::RuleStore;

/// Every admission and administration handler, sharing one set of ports.
#[derive(Debug, Clone)]
pub struct AdmissionServices {
    pub check: CheckAdmissionHandler,
    pub configure_client: ConfigureClientHandler,
    pub add_client: AddClientHandler,
    pub delete_rules: DeleteRulesHandler,
    pub remove_client: RemoveClientHandler,
    pub list_all_rules: ListAllRulesHandler,
    pub list_client_rules: ListClientRulesHandler,
    pub rule_store: RuleStore,
}

impl AdmissionServices {
    /// `lock_wait = None` waits for a busy client lock indefinitely.
    pub fn new(
        rules: Arc<dyn RuleRepository>,
        cache: Arc<dyn RuleCache>,
        clients: Arc<dyn ClientRepository>,
        lock: Arc<dyn ClientLock>,
        lock_wait: Option<Duration>,
        config: AdmissionConfig,
    ) -> Self {
        let scope = ClientLockScope::new(lock, lock_wait);
        let store = RuleStore::new(rules, cache);
        let registry = ClientRegistry::new(clients, store.clone(), scope.clone());

        Self {
            check: CheckAdmissionHandler::new(scope.clone(), registry.clone(), store.clone(), config),
            configure_client: ConfigureClientHandler::new(scope.clone(), registry.clone(), store.clone()),
            add_client: AddClientHandler::new(scope.clone(), registry.clone()),
            delete_rules: DeleteRulesHandler::new(scope, store.clone()),
            remove_client: RemoveClientHandler::new(registry),
            list_all_rules: ListAllRulesHandler::new(store.clone()),
            list_client_rules: ListClientRulesHandler::new(store.clone()),
            rule_store: store,
        }
    }
}
