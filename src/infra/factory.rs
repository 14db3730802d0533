use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::{PgConnectOptions, PgPoolOptions}, sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{Clock, KeyValueStore, VerificationPolicy};
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::data_repository::DataRepository;
use crate::domain::services::persistent_store::PersistentStore;
use crate::error::AppError;
use crate::infra::clock::SystemClock;
use crate::infra::repositories::{
    memory_kv_repo::MemoryKvRepo, postgres_kv_repo::PostgresKvRepo, sqlite_kv_repo::SqliteKvRepo,
};
use crate::infra::verification::RandomVerificationPolicy;
use crate::state::AppState;

/// Connects the durable backend named by `DATABASE_URL` and wires the
/// production collaborators around it.
pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let durable = connect_durable_store(&config.database_url).await?;
    let ephemeral: Arc<dyn KeyValueStore> = Arc::new(MemoryKvRepo::new());
    let verifier = Arc::new(RandomVerificationPolicy::new(
        config.payment_success_rate,
        Duration::from_millis(config.payment_verification_delay_ms),
    ));

    assemble_state(config, durable, ephemeral, Arc::new(SystemClock), verifier).await
}

/// Builds the state from already-constructed collaborators.
pub async fn assemble_state(
    config: &Config,
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    verifier: Arc<dyn VerificationPolicy>,
) -> Result<AppState, AppError> {
    let store = PersistentStore::new(durable.clone());
    let repo = DataRepository::load(store.clone(), clock.clone(), verifier).await?;
    let auth_service = Arc::new(AuthService::new(
        repo.clone(),
        repo.credentials().clone(),
        durable,
        ephemeral,
        clock,
        config.clone(),
    ));
    auth_service.restore().await?;

    Ok(AppState { config: config.clone(), store, repo, auth_service })
}

pub async fn connect_durable_store(database_url: &str) -> Result<Arc<dyn KeyValueStore>, AppError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts = PgConnectOptions::from_str(database_url)?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new().max_connections(10).connect_with(opts).await?;
        run_postgres_migrations(&pool).await?;

        Ok(Arc::new(PostgresKvRepo::new(pool)))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(opts).await?;
        run_sqlite_migrations(&pool).await?;

        Ok(Arc::new(SqliteKvRepo::new(pool)))
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(e.into()))
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(e.into()))
}
