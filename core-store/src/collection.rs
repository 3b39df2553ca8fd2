//! Handle to one named collection.

use crate::error::{Result, StoreError};
use crate::value::Value;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, warn};

struct Statements {
    put: String,
    fetch: String,
}

/// Keyed partition of a store.
///
/// Cheap to clone; clones share the pool. Every `put` and `fetch` is its own
/// transaction, so handles can be used concurrently without extra locking.
#[derive(Clone)]
pub struct Collection {
    name: Arc<str>,
    pool: SqlitePool,
    sql: Arc<Statements>,
}

impl Collection {
    pub(crate) fn new(name: &str, pool: SqlitePool) -> Self {
        let sql = Statements {
            put: format!(
                r#"INSERT INTO "{name}" (key, value) VALUES (?, ?)
                   ON CONFLICT(key) DO UPDATE SET value = excluded.value"#
            ),
            fetch: format!(r#"SELECT typeof(value) AS kind, value FROM "{name}" WHERE key = ?"#),
        };
        Self {
            name: Arc::from(name),
            pool,
            sql: Arc::new(sql),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace the value stored under `key`. Resolves once the
    /// write has committed.
    pub async fn put(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let query = sqlx::query(&self.sql.put).bind(key);
        let query = match &value {
            Value::Blob(bytes) => query.bind(&bytes[..]),
            Value::Number(n) => query.bind(*n),
            Value::Text(s) => query.bind(s.as_str()),
        };

        query.execute(&self.pool).await.map_err(|e| {
            warn!(collection = %self.name, key, error = %e, "Store write failed");
            StoreError::WriteFailed {
                collection: self.name.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(collection = %self.name, key, kind = value.kind(), "Stored value");
        Ok(())
    }

    /// Value stored under `key`, or `None` when absent.
    pub async fn fetch(&self, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query(&self.sql.fetch)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.read_failed(e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind: String = row.try_get("kind").map_err(|e| self.read_failed(e))?;
        let value = match kind.as_str() {
            "blob" => {
                let bytes: Vec<u8> = row.try_get("value").map_err(|e| self.read_failed(e))?;
                Some(Value::from(bytes))
            }
            "real" => Some(Value::Number(
                row.try_get::<f64, _>("value")
                    .map_err(|e| self.read_failed(e))?,
            )),
            "integer" => Some(Value::Number(
                row.try_get::<i64, _>("value")
                    .map_err(|e| self.read_failed(e))? as f64,
            )),
            "text" => Some(Value::Text(
                row.try_get("value").map_err(|e| self.read_failed(e))?,
            )),
            _ => None,
        };

        debug!(collection = %self.name, key, found = value.is_some(), "Fetched value");
        Ok(value)
    }

    /// Whether a value is stored under `key`.
    pub async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.fetch(key).await?.is_some())
    }

    fn read_failed(&self, e: sqlx::Error) -> StoreError {
        warn!(collection = %self.name, error = %e, "Store read failed");
        StoreError::ReadFailed {
            collection: self.name.to_string(),
            reason: e.to_string(),
        }
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
