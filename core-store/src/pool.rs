//! SQLite pool construction.

use crate::config::{StoreConfig, StoreLocation};
use crate::error::{Result, StoreError};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Open the pool backing the store called `name`.
///
/// File-backed stores run in WAL mode and create their directory and file on
/// first use. In-memory stores keep their single connection alive for the
/// lifetime of the pool.
pub(crate) async fn connect(name: &str, config: &StoreConfig) -> Result<SqlitePool> {
    let options = match &config.location {
        StoreLocation::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                warn!(error = %e, dir = %dir.display(), "Cannot create store directory");
                StoreError::unavailable(name, e)
            })?;
            let path = dir.join(format!("{}.sqlite", name));
            SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
        StoreLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::unavailable(name, e))?,
    }
    .busy_timeout(config.busy_timeout);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.acquire_timeout);

    if config.location == StoreLocation::Memory {
        pool_options = pool_options
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        warn!(store = name, error = %e, "Failed to open store");
        StoreError::unavailable(name, e)
    })?;

    health_check(name, &pool).await?;

    info!(
        store = name,
        in_memory = config.location == StoreLocation::Memory,
        "Store connection pool ready"
    );
    Ok(pool)
}

/// Round-trip a trivial query so a broken file fails at open time rather
/// than on the first read.
async fn health_check(name: &str, pool: &SqlitePool) -> Result<()> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::unavailable(name, format!("health check failed: {}", e)))?;
    debug!(store = name, "Store health check passed");
    Ok(())
}
