//! Durable rule store port.
//!
//! The system of record for rate limit rules. Point operations are keyed by
//! the structured [`RuleKey`]; enumeration is a scan and is never served
//! from the cache.

use async_trait::async_trait;

use crate::domain::admission::{RateLimitRule, RuleKey};
use crate::domain::foundation::ClientId;

/// Port for durable rule persistence.
///
/// No multi-key transactions are assumed: each call stands alone.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Point lookup by key.
    async fn find(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError>;

    /// Inserts or overwrites the rule stored under `rule.key()`.
    async fn save(&self, rule: &RateLimitRule) -> Result<(), StoreError>;

    /// Removes a rule. Returns false if nothing was stored under `key`.
    async fn delete(&self, key: &RuleKey) -> Result<bool, StoreError>;

    /// All rules owned by a client.
    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<RateLimitRule>, StoreError>;

    /// Every rule of every client.
    async fn list_all(&self) -> Result<Vec<RateLimitRule>, StoreError>;
}

/// Errors raised by storage collaborators (durable store and cache).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded into a valid domain value.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}
