//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the admission core to external systems:
//! - `storage` - In-memory rule and client repositories
//! - `postgres` - PostgreSQL rule and client repositories
//! - `cache` - Rule cache (in-memory, Redis)
//! - `lock` - Per-client lock (in-memory, Redis)
//! - `http` - Axum REST surface

pub mod cache;
pub mod http;
pub mod lock;
pub mod postgres;
pub mod storage;

mod redis_command;

pub use cache::{InMemoryRuleCache, RedisRuleCache};
pub use lock::{InMemoryClientLock, RedisClientLock};
pub use postgres::{PostgresClientRepository, PostgresRuleRepository};
pub use storage::{InMemoryClientRepository, InMemoryRuleRepository};
