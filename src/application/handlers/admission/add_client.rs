//! AddClientHandler - onboard a client explicitly.

use crate::domain::foundation::ClientId;

use super::client_registry::ClientRegistry;
use super::errors::AdmissionError;
use super::lock_scope::ClientLockScope;

/// Command to create a client with no rules.
#[derive(Debug, Clone)]
pub struct AddClientCommand {
    pub client_id: String,
}

/// Handler for explicit client creation. Fails with `Conflict` if present.
#[derive(Debug, Clone)]
pub struct AddClientHandler {
    lock: ClientLockScope,
    registry: ClientRegistry,
}

impl AddClientHandler {
    pub fn new(lock: ClientLockScope, registry: ClientRegistry) -> Self {
        Self { lock, registry }
    }

    pub async fn handle(&self, cmd: AddClientCommand) -> Result<ClientId, AdmissionError> {
        let client_id = ClientId::new(cmd.client_id)?;
        self.lock
            .run(&client_id, || self.registry.add(&client_id))
            .await?;
        Ok(client_id)
    }
}
