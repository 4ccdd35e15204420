//! Rule cache adapters.
//!
//! Implementations of the RuleCache port for different backends.
//!
//! ## Available Adapters
//!
//! - `InMemoryRuleCache` - In-memory for testing and single-server
//! - `RedisRuleCache` - Redis-backed for production multi-server

mod in_memory;
mod redis;

pub use in_memory::InMemoryRuleCache;
pub use self::redis::RedisRuleCache;
