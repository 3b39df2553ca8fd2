//! Store handles and the per-name registry.

use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::pool;
use crate::schema;
use core_async::sync::Mutex as AsyncMutex;
use parking_lot::Mutex;
use sqlx::sqlite::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// An opened store.
///
/// Holds the connection pool and hands out [`Collection`] handles, caching
/// them by name.
pub struct Store {
    name: String,
    pool: SqlitePool,
    version: Mutex<u32>,
    tables: Mutex<HashSet<String>>,
    collections: Mutex<HashMap<String, Collection>>,
}

impl Store {
    /// Open (creating if needed) the store called `name` at schema `version`.
    ///
    /// Missing collections are created when `version` is higher than the one
    /// recorded in the database. Existing data is never dropped.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidVersion`] for version 0
    /// - [`StoreError::InvalidCollection`] for a name that is not an identifier
    /// - [`StoreError::Unavailable`] when the database cannot be opened or upgraded
    #[instrument(skip(config, collections), fields(collections = collections.len()))]
    pub async fn open(
        name: &str,
        version: u32,
        collections: &[&str],
        config: &StoreConfig,
    ) -> Result<Self> {
        if version == 0 {
            return Err(StoreError::InvalidVersion(version));
        }
        for collection in collections {
            schema::validate_collection_name(collection)?;
        }

        let pool = pool::connect(name, config).await?;
        let version = schema::upgrade(name, &pool, version, collections).await?;
        let tables = schema::existing_collections(name, &pool).await?;

        info!(store = name, version, tables = tables.len(), "Store opened");

        Ok(Self {
            name: name.to_string(),
            pool,
            version: Mutex::new(version),
            tables: Mutex::new(tables),
            collections: Mutex::new(HashMap::new()),
        })
    }

    /// Re-run the schema step on an already open store.
    pub async fn upgrade(&self, version: u32, collections: &[&str]) -> Result<u32> {
        if version == 0 {
            return Err(StoreError::InvalidVersion(version));
        }
        for collection in collections {
            schema::validate_collection_name(collection)?;
        }

        let version = schema::upgrade(&self.name, &self.pool, version, collections).await?;
        let tables = schema::existing_collections(&self.name, &self.pool).await?;
        *self.version.lock() = version;
        *self.tables.lock() = tables;
        Ok(version)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version in effect.
    pub fn version(&self) -> u32 {
        *self.version.lock()
    }

    /// Handle bound to collection `name`. Repeated calls return clones of the
    /// same handle.
    pub fn get_collection(&self, name: &str) -> Result<Collection> {
        if let Some(collection) = self.collections.lock().get(name) {
            return Ok(collection.clone());
        }

        if !self.tables.lock().contains(name) {
            return Err(StoreError::UnknownCollection(name.to_string()));
        }

        let collection = self
            .collections
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name, self.pool.clone()))
            .clone();
        debug!(store = %self.name, collection = name, "Collection handle created");
        Ok(collection)
    }

    /// Close the pool. Later operations on any handle fail with
    /// `ReadFailed`/`WriteFailed`.
    pub async fn close(&self) {
        self.pool.close().await;
        info!(store = %self.name, "Store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

/// Opens each store once and shares it by name.
///
/// Controllers that use the same store name receive the same `Arc<Store>`,
/// so the pool and collection handles are shared.
pub struct StoreRegistry {
    config: StoreConfig,
    stores: AsyncMutex<HashMap<String, Arc<Store>>>,
}

impl StoreRegistry {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            stores: AsyncMutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open `name` or return the cached handle, upgrading it when `version`
    /// is higher than the cached one.
    ///
    /// A closed store is reopened. A failed open is not cached, so the next
    /// call retries.
    pub async fn open(&self, name: &str, version: u32, collections: &[&str]) -> Result<Arc<Store>> {
        let mut stores = self.stores.lock().await;

        if let Some(store) = stores.get(name) {
            if !store.is_closed() {
                if version > store.version() {
                    store.upgrade(version, collections).await?;
                }
                return Ok(Arc::clone(store));
            }
            debug!(store = name, "Cached store was closed, reopening");
        }

        let store = Arc::new(Store::open(name, version, collections, &self.config).await?);
        stores.insert(name.to_string(), Arc::clone(&store));
        Ok(store)
    }

    pub async fn len(&self) -> usize {
        self.stores.lock().await.len()
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
