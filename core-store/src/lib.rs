//! # Persistent Store
//!
//! Durable `collection + key -> value` mapping on SQLite.
//!
//! A [`Store`] is opened with a name, an integer schema version and the list
//! of collections it must provide. Each [`Collection`] supports `put`,
//! `fetch` and `has`; every call is its own transaction and collections never
//! share keyspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_store::{StoreConfig, StoreRegistry};
//!
//! let registry = StoreRegistry::new(StoreConfig::in_dir("/var/lib/player"));
//! let store = registry.open("offline-tracks", 1, &["blobs", "positions"]).await?;
//!
//! let positions = store.get_collection("positions")?;
//! positions.put("intro", 42.0).await?;
//! assert_eq!(positions.fetch("intro").await?.and_then(|v| v.as_f64()), Some(42.0));
//! assert!(!store.get_collection("blobs")?.has("intro").await?);
//! ```

pub mod collection;
pub mod config;
pub mod error;
mod pool;
mod schema;
pub mod store;
pub mod value;

pub use collection::Collection;
pub use config::{StoreConfig, StoreLocation};
pub use error::{Result, StoreError};
pub use store::{Store, StoreRegistry};
pub use value::Value;
