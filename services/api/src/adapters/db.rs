//! services/api/src/adapters/db.rs
//!
//! PostgreSQL backing for the `KeyValueStore` port. Every persisted value the
//! app owns (credentials, session pointer, language, saved recipes, onboarding
//! flags) is one row of `kv_store`, keyed the same way the core names its slots.

use async_trait::async_trait;
use kitchen_king_core::ports::{KeyValueStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::error;

const SELECT_VALUE: &str = "SELECT value FROM kv_store WHERE key = $1";
const UPSERT_VALUE: &str = "INSERT INTO kv_store (key, value) VALUES ($1, $2) \
     ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()";
const DELETE_VALUE: &str = "DELETE FROM kv_store WHERE key = $1";

//=========================================================================================
// The Store Adapter
//=========================================================================================

#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `services/api/migrations`.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct ValueRow {
    value: String,
}

/// Logs the driver error against the slot it touched and hides it behind the port.
fn storage_failure(op: &'static str, key: &str, e: sqlx::Error) -> PortError {
    error!(op, key, "kv_store query failed: {}", e);
    PortError::Unexpected(format!("kv_store {} failed", op))
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for DbAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let row = sqlx::query_as::<_, ValueRow>(SELECT_VALUE)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_failure("get", key, e))?;
        Ok(row.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(UPSERT_VALUE)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_failure("set", key, e))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let removed = sqlx::query(DELETE_VALUE)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_failure("remove", key, e))?;
        if removed.rows_affected() == 0 {
            tracing::debug!(key, "Nothing stored under key; remove was a no-op.");
        }
        Ok(())
    }
}
