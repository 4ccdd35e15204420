//! RemoveClientHandler - delete a client and all of its rules.

use crate::domain::foundation::ClientId;

use super::client_registry::ClientRegistry;
use super::errors::AdmissionError;

/// Command to remove a client.
#[derive(Debug, Clone)]
pub struct RemoveClientCommand {
    pub client_id: String,
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveClientResult {
    pub client_id: ClientId,
    pub rules_removed: usize,
}

/// Handler for client removal; delegates the cascade to [`ClientRegistry`].
#[derive(Debug, Clone)]
pub struct RemoveClientHandler {
    registry: ClientRegistry,
}

impl RemoveClientHandler {
    pub fn new(registry: ClientRegistry) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, cmd: RemoveClientCommand) -> Result<RemoveClientResult, AdmissionError> {
        let client_id = ClientId::new(cmd.client_id)?;
        let rules_removed = self.registry.remove(&client_id).await?;
        Ok(RemoveClientResult {
            client_id,
            rules_removed,
        })
    }
}
