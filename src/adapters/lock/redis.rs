//! Redis-backed distributed client lock.
//!
//! Acquisition is `SET key holder NX PX lease`, retried with capped
//! exponential backoff until the wait limit passes. The lease bounds how
//! long a crashed holder can block a client. Release deletes the key only
//! if it still names this holder (compare-and-delete in a Lua script).
//!
//! The lease is not renewed while the holder works. A critical section that
//! outlives it (a stalled database write, say) can overlap with the next
//! holder on another server, so keep the lease well above the slowest
//! expected check plus the Redis command timeout.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tokio::time::Instant;

use crate::adapters::redis_command::bounded;
use crate::domain::foundation::ClientId;
use crate::ports::{ClientLock, LockError, LockToken};

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

const INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

/// Distributed lock shared by every server instance.
#[derive(Clone)]
pub struct RedisClientLock {
    conn: MultiplexedConnection,
    prefix: String,
    lease: Duration,
    command_timeout: Option<Duration>,
}

impl RedisClientLock {
    /// Create a new Redis lock provider.
    ///
    /// `lease` is the auto-expiry applied to every acquired lock.
    pub fn new(conn: MultiplexedConnection, prefix: impl Into<String>, lease: Duration) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
            lease,
            command_timeout: None,
        }
    }

    /// Fail any single Redis command that takes longer than `limit`.
    pub fn with_command_timeout(mut self, limit: Duration) -> Self {
        self.command_timeout = Some(limit);
        self
    }

    fn redis_key(&self, client_id: &ClientId) -> String {
        format!("{}{}", self.prefix, client_id)
    }

    async fn try_set(&self, redis_key: &str, token: &LockToken) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();
        let mut set = redis::cmd("SET");
        set.arg(redis_key)
            .arg(token.holder().to_string())
            .arg("NX")
            .arg("PX")
            .arg(self.lease.as_millis() as u64);

        let reply: Option<String> = bounded(self.command_timeout, set.query_async(&mut conn))
            .await
            .map_err(LockError::Unavailable)?;
        Ok(reply.is_some())
    }
}

#[async_trait]
impl ClientLock for RedisClientLock {
    async fn acquire(&self, client_id: &ClientId, wait: Option<Duration>) -> Result<LockToken, LockError> {
        let redis_key = self.redis_key(client_id);
        let token = LockToken::new(client_id.clone());
        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            if self.try_set(&redis_key, &token).await? {
                tracing::debug!("Lock acquired for client: {}", client_id);
                return Ok(token);
            }

            let mut pause = backoff;
            if let Some(limit) = wait {
                let elapsed = started.elapsed();
                if elapsed >= limit {
                    let waited_ms = elapsed.as_millis() as u64;
                    tracing::warn!(
                        "Timed out after {}ms waiting for lock on client: {}",
                        waited_ms,
                        client_id
                    );
                    return Err(LockError::Timeout {
                        client_id: client_id.to_string(),
                        waited_ms,
                    });
                }
                pause = pause.min(limit - elapsed);
            }

            tokio::time::sleep(pause).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    async fn release(&self, token: LockToken) -> Result<(), LockError> {
        let redis_key = self.redis_key(token.client_id());
        let mut conn = self.conn.clone();

        let script = redis::Script::new(RELEASE_SCRIPT);
        let mut invocation = script.key(&redis_key);
        invocation.arg(token.holder().to_string());

        let deleted: i64 = bounded(self.command_timeout, invocation.invoke_async(&mut conn))
            .await
            .map_err(LockError::Unavailable)?;

        if deleted == 0 {
            tracing::warn!(
                "Attempt to release a lock not held by this holder for client: {}",
                token.client_id()
            );
        } else {
            tracing::debug!("Lock released for client: {}", token.client_id());
        }
        Ok(())
    }
}

impl std::fmt::Debug for RedisClientLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClientLock")
            .field("prefix", &self.prefix)
            .field("lease", &self.lease)
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}
