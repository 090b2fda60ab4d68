//! Persisted session storage
//!
//! A flat string key/value store, the client-side analogue of browser local
//! storage. The session manager keeps exactly two entries in it (`token` and
//! `username`); writes to the two keys are independent, so a torn write can
//! leave one without the other.
//!
//! Drivers:
//! - `SqliteStore` (default) - survives restarts
//! - `MemoryStore` - process lifetime only, also used by tests

mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{StorageConfig, StorageDriver};

pub use sqlite::SqliteStore;

/// Session store trait
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value (no-op when absent)
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Type alias for a shared session store
pub type DynSessionStore = Arc<dyn SessionStore>;

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Create a session store based on configuration
pub async fn create_store(config: &StorageConfig) -> Result<DynSessionStore> {
    match config.driver {
        StorageDriver::Sqlite => {
            let store = SqliteStore::open(&config.url).await?;
            Ok(Arc::new(store))
        }
        StorageDriver::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
