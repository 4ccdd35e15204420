//! Client lock adapters.
//!
//! Implementations of the ClientLock port.
//!
//! ## Available Adapters
//!
//! - `InMemoryClientLock` - In-process, for testing and single-server
//! - `RedisClientLock` - Redis lease lock for multi-server deployments
//!
//! ## Usage
//!
//! ```ignore
//! use admission_control::adapters::lock::{InMemoryClientLock, RedisClientLock};
//!
//! // For testing
//! let lock = InMemoryClientLock::new();
//!
//! // For production
//! let lock = RedisClientLock::new(conn, "client_lock:", Duration::from_secs(30));
//! ```

mod in_memory;
mod redis;

pub use in_memory::InMemoryClientLock;
pub use self::redis::RedisClientLock;
