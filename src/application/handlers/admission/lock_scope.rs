//! Scoped per-client critical sections.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::ClientId;
use crate::ports::{ClientLock, LockError, LockToken};

use super::errors::AdmissionError;

/// Runs work while holding one client's lock.
///
/// The lock is released on every exit path of the body: success, denial,
/// error, panic, or the caller dropping the future mid-flight. A failed
/// release after a failed body is logged and the body's error wins.
#[derive(Clone)]
pub struct ClientLockScope {
    lock: Arc<dyn ClientLock>,
    wait: Option<Duration>,
}

impl ClientLockScope {
    /// `wait = None` blocks until the lock is free.
    pub fn new(lock: Arc<dyn ClientLock>, wait: Option<Duration>) -> Self {
        Self { lock, wait }
    }

    /// Acquires `client_id`'s lock, awaits `body`, then releases.
    pub async fn run<T, F, Fut>(&self, client_id: &ClientId, body: F) -> Result<T, AdmissionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AdmissionError>>,
    {
        let token = self.lock.acquire(client_id, self.wait).await?;
        let mut held = HeldLock::new(self.lock.clone(), token);

        let result = body().await;

        let released = match held.disarm() {
            Some(token) => release_detached(self.lock.clone(), token).await,
            None => Ok(()),
        };

        match (result, released) {
            (result, Ok(())) => result,
            (Ok(_), Err(release_err)) => {
                tracing::error!("Failed to release lock for client {}: {}", client_id, release_err);
                Err(release_err.into())
            }
            (Err(err), Err(release_err)) => {
                tracing::error!("Failed to release lock for client {}: {}", client_id, release_err);
                Err(err)
            }
        }
    }
}

/// Releases on a spawned task so the release itself survives cancellation
/// of the caller.
async fn release_detached(lock: Arc<dyn ClientLock>, token: LockToken) -> Result<(), LockError> {
    tokio::spawn(async move { lock.release(token).await })
        .await
        .unwrap_or_else(|e| Err(LockError::Unavailable(format!("release task failed: {}", e))))
}

/// A held token that is released from `Drop` unless disarmed first.
///
/// Covers a body future dropped mid-flight (request timeout, client
/// disconnect) and a panicking body.
struct HeldLock {
    lock: Arc<dyn ClientLock>,
    token: Option<LockToken>,
}

impl HeldLock {
    fn new(lock: Arc<dyn ClientLock>, token: LockToken) -> Self {
        Self {
            lock,
            token: Some(token),
        }
    }

    fn disarm(&mut self) -> Option<LockToken> {
        self.token.take()
    }
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };

        tracing::warn!("Lock scope for client {} abandoned; releasing in background", token.client_id());
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let lock = self.lock.clone();
                handle.spawn(async move {
                    if let Err(e) = lock.release(token).await {
                        tracing::error!("Background lock release failed: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::error!(
                    "No runtime to release lock for client {}; it stays held until its lease expires",
                    token.client_id()
                );
            }
        }
    }
}

impl std::fmt::Debug for ClientLockScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientLockScope")
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}
