//! Redis-backed rule cache for production deployments.
//!
//! Each rule is stored as a JSON string under `{prefix}{rule_key.storage_key()}`.
//! No TTL is set: entries live until overwritten, evicted, or dropped by
//! the Redis eviction policy.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::adapters::redis_command::bounded;

use crate::domain::admission::{RateLimitRule, RuleKey};
use crate::ports::{RuleCache, StoreError};

/// Redis rule cache shared by every server instance.
#[derive(Clone)]
pub struct RedisRuleCache {
    conn: MultiplexedConnection,
    prefix: String,
    command_timeout: Option<Duration>,
}

impl RedisRuleCache {
    /// Create a new Redis rule cache with unbounded commands.
    pub fn new(conn: MultiplexedConnection, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
            command_timeout: None,
        }
    }

    /// Fail any single command that takes longer than `limit`.
    pub fn with_command_timeout(mut self, limit: Duration) -> Self {
        self.command_timeout = Some(limit);
        self
    }

    fn redis_key(&self, key: &RuleKey) -> String {
        format!("{}{}", self.prefix, key.storage_key())
    }
}

#[async_trait]
impl RuleCache for RedisRuleCache {
    async fn get(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn.clone();

        let raw: Option<String> = bounded(self.command_timeout, conn.get(&redis_key))
            .await
            .map_err(StoreError::Unavailable)?;

        raw.map(|json| {
            serde_json::from_str::<RateLimitRule>(&json)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", redis_key, e)))
        })
        .transpose()
    }

    async fn put(&self, rule: &RateLimitRule) -> Result<(), StoreError> {
        let redis_key = self.redis_key(rule.key());
        let json = serde_json::to_string(rule)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", redis_key, e)))?;
        let mut conn = self.conn.clone();

        bounded(self.command_timeout, conn.set::<_, _, ()>(&redis_key, json))
            .await
            .map_err(StoreError::Unavailable)?;

        Ok(())
    }

    async fn evict(&self, key: &RuleKey) -> Result<(), StoreError> {
        let redis_key = self.redis_key(key);
        let mut conn = self.conn.clone();

        bounded(self.command_timeout, conn.del::<_, ()>(&redis_key))
            .await
            .map_err(StoreError::Unavailable)?;

        Ok(())
    }
}

impl std::fmt::Debug for RedisRuleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRuleCache")
            .field("prefix", &self.prefix)
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}
