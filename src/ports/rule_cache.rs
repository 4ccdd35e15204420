//! Rule cache port.
//!
//! A fast key-value cache in front of the [`RuleRepository`](super::RuleRepository).
//! Entries may be evicted at any time; no ordering or transactional
//! guarantee is assumed.

use async_trait::async_trait;

use crate::domain::admission::{RateLimitRule, RuleKey};

use super::StoreError;

/// Port for point-lookup rule caching.
#[async_trait]
pub trait RuleCache: Send + Sync {
    /// Returns the cached rule, if present.
    async fn get(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError>;

    /// Stores (or replaces) the cached copy of a rule.
    async fn put(&self, rule: &RateLimitRule) -> Result<(), StoreError>;

    /// Drops the cached copy of a rule. Missing entries are not an error.
    async fn evict(&self, key: &RuleKey) -> Result<(), StoreError>;
}
