//! Collection tables and schema versioning.
//!
//! Each collection is a table `(key TEXT PRIMARY KEY, value BLOB)` with a
//! unique index on `key`. The schema version lives in `PRAGMA user_version`.
//! Opening with a higher version creates any missing collection tables and
//! never touches existing ones; opening with the same or a lower version
//! changes nothing.

use crate::error::{Result, StoreError};
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, info};

pub(crate) fn validate_collection_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_head = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

pub(crate) async fn current_version(name: &str, pool: &SqlitePool) -> Result<u32> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::unavailable(name, e))?;
    Ok(version.max(0) as u32)
}

/// Bring the schema up to `version`, returning the version now in effect.
pub(crate) async fn upgrade(
    name: &str,
    pool: &SqlitePool,
    version: u32,
    collections: &[&str],
) -> Result<u32> {
    let current = current_version(name, pool).await?;
    if version <= current {
        debug!(
            store = name,
            requested = version,
            current,
            "Schema up to date"
        );
        return Ok(current);
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| StoreError::unavailable(name, e))?;

    for collection in collections {
        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{collection}" (
                key TEXT PRIMARY KEY NOT NULL,
                value BLOB
            )"#
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::unavailable(name, e))?;

        sqlx::query(&format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS "{collection}_key" ON "{collection}" (key)"#
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::unavailable(name, e))?;
    }

    // PRAGMA arguments cannot be bound; `version` is an integer.
    sqlx::query(&format!("PRAGMA user_version = {}", version))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::unavailable(name, e))?;

    tx.commit()
        .await
        .map_err(|e| StoreError::unavailable(name, e))?;

    info!(store = name, from = current, to = version, "Schema upgraded");
    Ok(version)
}

/// Names of the collection tables present in the database.
pub(crate) async fn existing_collections(name: &str, pool: &SqlitePool) -> Result<HashSet<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::unavailable(name, e))?;
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_must_be_identifiers() {
        assert!(validate_collection_name("blobs").is_ok());
        assert!(validate_collection_name("_positions2").is_ok());
        for bad in ["", "2blobs", "blo bs", "x\"; DROP TABLE y; --", "é"] {
            assert!(matches!(
                validate_collection_name(bad),
                Err(StoreError::InvalidCollection(_))
            ));
        }
    }
}
