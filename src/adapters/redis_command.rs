//! Deadline for single Redis round trips.
//!
//! A multiplexed connection queues commands behind a stalled one, so every
//! cache and lock command is bounded separately from connection setup.

use std::future::Future;
use std::time::Duration;

/// Awaits `command`, failing with a message once `limit` passes.
///
/// `limit = None` leaves the command unbounded.
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, command: F) -> Result<T, String>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    let result = match limit {
        Some(limit) => tokio::time::timeout(limit, command)
            .await
            .map_err(|_| format!("redis command timed out after {}ms", limit.as_millis()))?,
        None => command.await,
    };
    result.map_err(|e| e.to_string())
}
