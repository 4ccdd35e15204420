//! In-Memory Client Repository Adapter

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ClientId;
use crate::ports::{ClientRepository, StoreError};

/// In-memory set of onboarded clients.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<BTreeSet<ClientId>>>,
}

impl InMemoryClientRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all known clients
    pub async fn all(&self) -> Vec<ClientId> {
        self.clients.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn exists(&self, client_id: &ClientId) -> Result<bool, StoreError> {
        Ok(self.clients.read().await.contains(client_id))
    }

    async fn insert(&self, client_id: &ClientId) -> Result<bool, StoreError> {
        Ok(self.clients.write().await.insert(client_id.clone()))
    }

    async fn delete(&self, client_id: &ClientId) -> Result<bool, StoreError> {
        Ok(self.clients.write().await.remove(client_id))
    }
}
