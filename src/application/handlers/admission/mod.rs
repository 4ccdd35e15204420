//! Admission handlers.
//!
//! ## Components
//! - `ClientLockScope` - per-client critical sections
//! - `RuleStore` - cache-aside rule access
//! - `ClientRegistry` - client records and cascade removal
//! - `RuleResolver` - tiered rule lookup for a request
//!
//! ## Commands
//! - Checking a request (`CheckAdmissionHandler`)
//! - Upserting rules, adding clients, deleting rules, removing clients
//!
//! ## Queries
//! - Listing all rules, listing one client's rules

mod add_client;
mod check_admission;
mod client_registry;
mod configure_client;
mod delete_rules;
mod errors;
mod list_rules;
mod lock_scope;
mod remove_client;
mod rule_resolver;
mod rule_store;
mod services;

pub use client_registry::ClientRegistry;
pub use errors::AdmissionError;
pub use lock_scope::ClientLockScope;
pub use rule_resolver::RuleResolver;
pub use rule_store::RuleStore;
pub use services::AdmissionServices;

// Commands
pub use add_client::{AddClientCommand, AddClientHandler};
pub use check_admission::{AdmissionConfig, CheckAdmissionCommand, CheckAdmissionHandler};
pub use configure_client::{ConfigureClientCommand, ConfigureClientHandler, ConfigureClientResult};
pub use delete_rules::{DeleteRulesCommand, DeleteRulesHandler, DeleteRulesResult};
pub use remove_client::{RemoveClientCommand, RemoveClientHandler, RemoveClientResult};

// Queries
pub use list_rules::{ListAllRulesHandler, ListClientRulesHandler, ListClientRulesQuery};
