//! In-process client lock.
//!
//! Tracks the holder of each client's lock in a map and wakes waiters
//! through a [`Notify`] whenever any lock is released. Only serializes
//! callers within one process; use the Redis lock across servers.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::foundation::ClientId;
use crate::ports::{ClientLock, LockError, LockToken};

/// In-memory keyed lock for tests and single-server deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientLock {
    held: Arc<Mutex<HashMap<ClientId, Uuid>>>,
    released: Arc<Notify>,
}

impl InMemoryClientLock {
    /// Create a lock provider with no locks held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if some caller currently holds `client_id`'s lock.
    pub async fn is_held(&self, client_id: &ClientId) -> bool {
        self.held.lock().await.contains_key(client_id)
    }
}

#[async_trait]
impl ClientLock for InMemoryClientLock {
    async fn acquire(&self, client_id: &ClientId, wait: Option<Duration>) -> Result<LockToken, LockError> {
        let started = Instant::now();
        let deadline = wait.map(|limit| started + limit);

        loop {
            // Register interest before checking, so a release between the
            // check and the await still wakes us.
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut held = self.held.lock().await;
                if let Entry::Vacant(slot) = held.entry(client_id.clone()) {
                    let token = LockToken::new(client_id.clone());
                    slot.insert(token.holder());
                    tracing::debug!("Lock acquired for client: {}", client_id);
                    return Ok(token);
                }
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        let waited_ms = started.elapsed().as_millis() as u64;
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
                }
                None => notified.await,
            }
        }
    }

    async fn release(&self, token: LockToken) -> Result<(), LockError> {
        let mut held = self.held.lock().await;
        match held.get(token.client_id()) {
            Some(holder) if *holder == token.holder() => {
                held.remove(token.client_id());
                drop(held);
                self.released.notify_waiters();
                tracing::debug!("Lock released for client: {}", token.client_id());
            }
            _ => {
                tracing::warn!(
                    "Attempt to release a lock not held by this holder for client: {}",
                    token.client_id()
                );
            }
        }
        Ok(())
    }
}
