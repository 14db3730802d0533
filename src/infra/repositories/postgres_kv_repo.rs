use crate::domain::ports::KeyValueStore;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresKvRepo { pool: PgPool }
impl PostgresKvRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl KeyValueStore for PostgresKvRepo {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at"
        )
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool).await
            .map_err(|e| {
                error!("Postgres write for key {} failed: {:?}", key, e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
