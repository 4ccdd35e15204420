//! PostgreSQL implementation of ClientRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::ClientId;
use crate::ports::{ClientRepository, StoreError};

/// PostgreSQL implementation of the ClientRepository port.
///
/// Deleting a client cascades to its rows in `rate_limit_rules`.
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    /// Creates a new PostgresClientRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> StoreError {
    tracing::error!("{}: {}", context, e);
    StoreError::Unavailable(format!("{}: {}", context, e))
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn exists(&self, client_id: &ClientId) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE client_id = $1)")
                .bind(client_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to check client", e))?;

        Ok(exists)
    }

    async fn insert(&self, client_id: &ClientId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (client_id, created_at)
            VALUES ($1, NOW())
            ON CONFLICT (client_id) DO NOTHING
            "#,
        )
        .bind(client_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert client", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, client_id: &ClientId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE client_id = $1")
            .bind(client_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete client", e))?;

        Ok(result.rows_affected() > 0)
    }
}
