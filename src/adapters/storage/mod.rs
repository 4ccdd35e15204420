//! Storage Adapters
//!
//! In-memory implementations of the durable storage ports.
//!
//! ## Available Adapters
//!
//! - **InMemoryRuleRepository** - Rules in a process-local map
//! - **InMemoryClientRepository** - Client records in a process-local set
//!
//! For production use the PostgreSQL adapters in `adapters::postgres`.
//!
//! ## Usage
//!
//! ```ignore
//! use admission_control::adapters::storage::{InMemoryClientRepository, InMemoryRuleRepository};
//!
//! let rules = InMemoryRuleRepository::new();
//! let clients = InMemoryClientRepository::new();
//! ```

mod in_memory_client_repository;
mod in_memory_rule_repository;

pub use in_memory_client_repository::InMemoryClientRepository;
pub use in_memory_rule_repository::InMemoryRuleRepository;
