//! Keyed mutual-exclusion port.
//!
//! Every read-decide-persist sequence touching a client's rules runs while
//! holding that client's lock. Different clients never contend.
//!
//! Implementations hand out a [`LockToken`] naming the holder. Releasing a
//! token that no longer holds the lock (expired lease, double release) is
//! a no-op logged as a warning, never an error.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::ClientId;

/// Port for per-client locking.
#[async_trait]
pub trait ClientLock: Send + Sync {
    /// Blocks until the lock for `client_id` is held.
    ///
    /// With `wait = Some(limit)` gives up after `limit` with
    /// [`LockError::Timeout`]; with `None` waits indefinitely.
    async fn acquire(&self, client_id: &ClientId, wait: Option<Duration>) -> Result<LockToken, LockError>;

    /// Releases a lock previously returned by [`acquire`](Self::acquire).
    async fn release(&self, token: LockToken) -> Result<(), LockError>;
}

/// Proof of holding a client's lock.
///
/// Deliberately not `Clone`: a token is released at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct LockToken {
    client_id: ClientId,
    holder: Uuid,
}

impl LockToken {
    /// Creates a token for a fresh, unique holder.
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            holder: Uuid::new_v4(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn holder(&self) -> Uuid {
        self.holder
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.client_id, self.holder)
    }
}

/// Errors that can occur while acquiring or releasing a client lock.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LockError {
    /// The bounded wait elapsed while another holder kept the lock.
    #[error("timed out after {waited_ms}ms waiting for lock on client '{client_id}'")]
    Timeout { client_id: String, waited_ms: u64 },

    /// The lock provider could not be reached.
    #[error("lock provider unavailable: {0}")]
    Unavailable(String),
}
