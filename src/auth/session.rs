//! Key-value session storage
//!
//! The auth service never touches a global; it is handed one of these.

use crate::error::AdvisoryError;
use crate::Result;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, warn};

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// Sessions in a `crm_sessions` table, created on first use
pub struct PostgresSessionStore {
    pool: PgPool,
    schema_ready: Arc<OnceCell<()>>,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// Lazy pool; nothing connects until the first query
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)?;
        Ok(Self::new(pool))
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS crm_sessions (
                      session_key TEXT PRIMARY KEY,
                      session_value TEXT NOT NULL,
                      updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                    );
                    "#,
                )
                .execute(&self.pool)
                .await?;

                Ok::<(), sqlx::Error>(())
            })
            .await
            .map_err(|e| {
                AdvisoryError::DatabaseError(format!(
                    "Failed to initialize session schema: {}",
                    e
                ))
            })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for PostgresSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_schema().await?;

        let row = sqlx::query("SELECT session_value FROM crm_sessions WHERE session_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AdvisoryError::SessionStoreError(format!("read {}: {}", key, e)))?;

        match row {
            Some(row) => {
                let value: String = row.try_get("session_value").map_err(|e| {
                    AdvisoryError::SessionStoreError(format!("decode {}: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.ensure_schema().await?;

        sqlx::query(
            r#"
            INSERT INTO crm_sessions (session_key, session_value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (session_key)
            DO UPDATE SET session_value = EXCLUDED.session_value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await
        .map_err(|e| AdvisoryError::SessionStoreError(format!("write {}: {}", key, e)))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_schema().await?;

        sqlx::query("DELETE FROM crm_sessions WHERE session_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| AdvisoryError::SessionStoreError(format!("remove {}: {}", key, e)))?;

        Ok(())
    }
}

/// Postgres when a URL is given and the pool can be built, in-memory otherwise
pub fn build_session_store(database_url: Option<&str>) -> Arc<dyn SessionStore> {
    if let Some(url) = database_url {
        match PostgresSessionStore::connect_lazy(url) {
            Ok(store) => {
                info!("Session store backend: postgres");
                return Arc::new(store);
            }
            Err(error) => {
                warn!(
                    "Failed to initialize postgres session store, falling back to in-memory: {}",
                    error
                );
            }
        }
    }

    info!("Session store backend: in-memory");
    Arc::new(InMemorySessionStore::new())
}
