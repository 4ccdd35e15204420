//! Durable client record port.

use async_trait::async_trait;

use crate::domain::foundation::ClientId;

use super::StoreError;

/// Port for onboarded client records.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Checks whether a client record exists.
    async fn exists(&self, client_id: &ClientId) -> Result<bool, StoreError>;

    /// Creates a client record. Returns false if it already existed.
    async fn insert(&self, client_id: &ClientId) -> Result<bool, StoreError>;

    /// Deletes a client record. Returns false if there was none.
    async fn delete(&self, client_id: &ClientId) -> Result<bool, StoreError>;
}
