use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use tracing::warn;

use crate::db::{
    debounce::{DEBOUNCE_DELAY, DebouncedWriter},
    init::{connect, connect_in_memory},
    utils::{delete_value, select_value, storage_key, upsert_value},
};

/// JSON documents keyed by name, cached in memory and persisted to SQLite.
///
/// Clones share the same connection, cache and debounced writer.
#[derive(Clone, Debug)]
pub struct Store {
    connection: Pool<Sqlite>,
    cache: Arc<Mutex<HashMap<String, Value>>>,
    writer: Arc<DebouncedWriter>,
}

impl Store {
    pub async fn connect(path: &Path) -> Result<Self> {
        Ok(Self::with_connection(connect(path).await?, DEBOUNCE_DELAY))
    }

    pub async fn in_memory() -> Result<Self> {
        Ok(Self::with_connection(connect_in_memory().await?, DEBOUNCE_DELAY))
    }

    pub fn with_connection(connection: Pool<Sqlite>, delay: Duration) -> Self {
        let writer = DebouncedWriter::spawn(connection.clone(), delay);
        Self {
            connection,
            cache: Arc::new(Mutex::new(HashMap::new())),
            writer: Arc::new(writer),
        }
    }

    pub fn connection(&self) -> &Pool<Sqlite> {
        &self.connection
    }

    /// Reads `name`, falling back to `default` when it is missing or cannot
    /// be decoded.
    pub async fn read_or<T>(&self, name: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        match self.read::<T>(name).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("Failed to read '{}', using default: {:?}", name, e);
                default
            }
        }
    }

    pub async fn read<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = storage_key(name);

        let cached = self.cache_get(&key);
        let value = match cached {
            Some(value) => Some(value),
            None => {
                let value = select_value(&self.connection, &key).await?;
                if let Some(v) = &value {
                    self.cache_put(&key, v.clone());
                }
                value
            }
        };

        value
            .map(|v| {
                serde_json::from_value::<T>(v)
                    .with_context(|| format!("Failed to decode stored '{}'", name))
            })
            .transpose()
    }

    /// Writes immediately.
    pub async fn write<T>(&self, name: &str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let key = storage_key(name);
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to encode '{}'", name))?;

        upsert_value(&self.connection, &key, &value).await?;
        self.cache_put(&key, value);

        Ok(())
    }

    /// Updates the cache now and persists after the debounce delay.
    pub fn save_debounced<T>(&self, name: &str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let key = storage_key(name);
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to encode '{}'", name))?;

        self.cache_put(&key, value.clone());
        self.writer.write(key, value);

        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Result<()> {
        let key = storage_key(name);
        self.clear_cache(Some(name));
        delete_value(&self.connection, &key).await
    }

    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Drops one cached entry, or all of them.
    pub fn clear_cache(&self, name: Option<&str>) {
        if let Ok(mut cache) = self.cache.lock() {
            match name {
                Some(name) => {
                    cache.remove(&storage_key(name));
                }
                None => cache.clear(),
            }
        }
    }

    fn cache_get(&self, key: &str) -> Option<Value> {
        self.cache.lock().ok().and_then(|c| c.get(key).cloned())
    }

    fn cache_put(&self, key: &str, value: Value) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key.to_string(), value);
        }
    }
}
