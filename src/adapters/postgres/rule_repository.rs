//! PostgreSQL implementation of RuleRepository.
//!
//! Rules live in `rate_limit_rules`, keyed by `(client_id, tier, scope_name)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::admission::{LimitTier, RateLimitRule, RefillUnit, RuleKey};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::{RuleRepository, StoreError};

/// PostgreSQL implementation of the RuleRepository port.
///
/// Uses sqlx for database operations with connection pooling.
pub struct PostgresRuleRepository {
    pool: PgPool,
}

impl PostgresRuleRepository {
    /// Creates a new PostgresRuleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a rule.
#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    client_id: String,
    tier: String,
    scope_name: String,
    time_unit: String,
    max_permits: i64,
    available_permits: f64,
    last_refill_at: DateTime<Utc>,
}

impl TryFrom<RuleRow> for RateLimitRule {
    type Error = StoreError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::foundation::ValidationError| {
            StoreError::Corrupt(format!(
                "rule {}/{}/{}: {}",
                row.client_id, row.tier, row.scope_name, e
            ))
        };

        let client_id = ClientId::new(row.client_id.clone()).map_err(corrupt)?;
        let tier: LimitTier = row.tier.parse().map_err(corrupt)?;
        let time_unit: RefillUnit = row.time_unit.parse().map_err(corrupt)?;
        let max_permits = u32::try_from(row.max_permits).map_err(|_| {
            StoreError::Corrupt(format!("max_permits out of range: {}", row.max_permits))
        })?;
        let key = RuleKey::new(client_id, tier, row.scope_name.clone()).map_err(corrupt)?;

        RateLimitRule::restore(
            key,
            time_unit,
            max_permits,
            row.available_permits,
            Timestamp::from_datetime(row.last_refill_at),
        )
        .map_err(corrupt)
    }
}

fn db_error(context: &str, e: sqlx::Error) -> StoreError {
    tracing::error!("{}: {}", context, e);
    StoreError::Unavailable(format!("{}: {}", context, e))
}

const SELECT_COLUMNS: &str = r#"
    SELECT client_id, tier, scope_name, time_unit, max_permits, available_permits, last_refill_at
    FROM rate_limit_rules
"#;

#[async_trait]
impl RuleRepository for PostgresRuleRepository {
    async fn find(&self, key: &RuleKey) -> Result<Option<RateLimitRule>, StoreError> {
        let sql = format!(
            "{} WHERE client_id = $1 AND tier = $2 AND scope_name = $3",
            SELECT_COLUMNS
        );
        let row: Option<RuleRow> = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(key.client_id().as_str())
            .bind(key.tier().as_str())
            .bind(key.scope_name())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch rule", e))?;

        row.map(RateLimitRule::try_from).transpose()
    }

    async fn save(&self, rule: &RateLimitRule) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO rate_limit_rules (
                client_id, tier, scope_name, time_unit, max_permits, available_permits, last_refill_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (client_id, tier, scope_name) DO UPDATE SET
                time_unit = EXCLUDED.time_unit,
                max_permits = EXCLUDED.max_permits,
                available_permits = EXCLUDED.available_permits,
                last_refill_at = EXCLUDED.last_refill_at
            "#,
        )
        .bind(rule.key().client_id().as_str())
        .bind(rule.key().tier().as_str())
        .bind(rule.key().scope_name())
        .bind(rule.time_unit().as_str())
        .bind(i64::from(rule.max_permits()))
        .bind(rule.available_permits())
        .bind(rule.last_refill_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save rule", e))?;

        Ok(())
    }

    async fn delete(&self, key: &RuleKey) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM rate_limit_rules WHERE client_id = $1 AND tier = $2 AND scope_name = $3",
        )
        .bind(key.client_id().as_str())
        .bind(key.tier().as_str())
        .bind(key.scope_name())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete rule", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<RateLimitRule>, StoreError> {
        let sql = format!("{} WHERE client_id = $1 ORDER BY tier, scope_name", SELECT_COLUMNS);
        let rows: Vec<RuleRow> = sqlx::query_as::<_, RuleRow>(&sql)
            .bind(client_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list client rules", e))?;

        rows.into_iter().map(RateLimitRule::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<RateLimitRule>, StoreError> {
        let sql = format!("{} ORDER BY client_id, tier, scope_name", SELECT_COLUMNS);
        let rows: Vec<RuleRow> = sqlx::query_as::<_, RuleRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list rules", e))?;

        rows.into_iter().map(RateLimitRule::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RuleRow {
        RuleRow {
            client_id: "acme".to_string(),
            tier: "API".to_string(),
            scope_name: "/v1/orders".to_string(),
            time_unit: "MIN".to_string(),
            max_permits: 20,
            available_permits: 12.5,
            last_refill_at: Utc::now(),
        }
    }

    #[test]
    fn valid_row_converts_to_rule() {
        let rule = RateLimitRule::try_from(row()).unwrap();
        assert_eq!(rule.key().tier(), LimitTier::Api);
        assert_eq!(rule.time_unit(), RefillUnit::Min);
        assert_eq!(rule.max_permits(), 20);
        assert_eq!(rule.available_permits(), 12.5);
    }

    #[test]
    fn unknown_tier_is_corrupt() {
        let mut bad = row();
        bad.tier = "CUSTOM".to_string();
        assert!(matches!(RateLimitRule::try_from(bad), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn negative_capacity_is_corrupt() {
        let mut bad = row();
        bad.max_permits = -1;
        assert!(matches!(RateLimitRule::try_from(bad), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn overfull_balance_is_corrupt() {
        let mut bad = row();
        bad.available_permits = 21.0;
        assert!(matches!(RateLimitRule::try_from(bad), Err(StoreError::Corrupt(_))));
    }
}
