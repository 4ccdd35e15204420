//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the admission core and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `RuleRepository` - Durable rule store (system of record)
//! - `RuleCache` - Fast, evictable cache in front of the rule store
//! - `ClientRepository` - Durable onboarded-client records
//!
//! ## Coordination Ports
//!
//! - `ClientLock` - Keyed mutual exclusion, one lock per client

mod client_lock;
mod client_repository;
mod rule_cache;
mod rule_repository;

pub use client_lock::{ClientLock, LockError, LockToken};
pub use client_repository::ClientRepository;
pub use rule_cache::RuleCache;
pub use rule_repository::{RuleRepository, StoreError};
