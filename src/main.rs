//! Admission control server.
//!
//! Loads configuration, connects PostgreSQL and Redis, warms the rule
//! cache and serves the rate limiter API.

use std::sync::Arc;

use thiserror::Error;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use admission_control::adapters::cache::RedisRuleCache;
use admission_control::adapters::http::{admission_router, AdmissionAppState};
use admission_control::adapters::lock::RedisClientLock;
use admission_control::adapters::postgres::{PostgresClientRepository, PostgresRuleRepository};
use admission_control::application::{AdmissionError, AdmissionServices};
use admission_control::config::{AppConfig, ConfigError, ValidationError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis connection timed out after {0:?}")]
    RedisTimeout(std::time::Duration),

    #[error("cache warm-up failed: {0}")]
    Warmup(#[from] AdmissionError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_timeout = config.redis.timeout();
    let conn = tokio::time::timeout(redis_timeout, redis_client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| StartupError::RedisTimeout(redis_timeout))??;

    let settings = &config.admission;
    let services = AdmissionServices::new(
        Arc::new(PostgresRuleRepository::new(pool.clone())),
        Arc::new(
            RedisRuleCache::new(conn.clone(), settings.cache_prefix.clone())
                .with_command_timeout(config.redis.command_timeout()),
        ),
        Arc::new(PostgresClientRepository::new(pool)),
        Arc::new(
            RedisClientLock::new(conn, settings.lock_prefix.clone(), settings.lock_lease())
                .with_command_timeout(config.redis.command_timeout()),
        ),
        settings.lock_wait(),
        settings.engine_config()?,
    );

    if settings.warm_cache_on_startup {
        services.rule_store.warm().await?;
    }

    let app = admission_router()
        .with_state(AdmissionAppState::new(services))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        auto_provision = settings.auto_provision,
        "Starting admission control server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
