//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresRuleRepository` - System of record for rate limit rules
//! - `PostgresClientRepository` - Onboarded client records
//!
//! Schema lives in `migrations/`.

mod client_repository;
mod rule_repository;

pub use client_repository::PostgresClientRepository;
pub use rule_repository::PostgresRuleRepository;
