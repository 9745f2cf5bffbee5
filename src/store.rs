use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

pub const JOBS_KEY: &str = "jobs_seed";
pub const SAVED_KEY: &str = "saved_jobs";
pub const APPLIED_KEY: &str = "applications";
pub const RECENT_KEY: &str = "recent_searches";

/// Durable key-value capability. Values are JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored document, or `None` if the key was never set.
    async fn get_raw(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrites the document stored under `key`.
    async fn set_raw(&self, key: &str, value: Value) -> Result<()>;
}

impl<'a> dyn KeyValueStore + 'a {
    /// Reads `key`, falling back to `default` when nothing is stored.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.get_raw(key).await? {
            Some(Value::Null) | None => Ok(default),
            Some(value) => serde_json::from_value(value)
                .with_context(|| format!("Stored value for '{}' has an unexpected shape", key)),
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize value for '{}'", key))?;
        tracing::debug!(key, "persisting");
        self.set_raw(key, value).await
    }
}

/// In-process store. Keeps a per-key write counter for inspection.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<String, Value>,
    writes: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn write_count(&self, key: &str) -> usize {
        self.inner.lock().await.writes.get(key).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub async fn raw(&self, key: &str) -> Option<Value> {
        self.inner.lock().await.values.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.inner.lock().await.values.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.values.insert(key.to_string(), value);
        *inner.writes.entry(key.to_string()).or_default() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_falls_back_to_default() {
        let store = MemoryStore::new();
        let kv: &dyn KeyValueStore = &store;
        let ids: Vec<String> = kv.get(SAVED_KEY, vec!["fallback".to_string()]).await.unwrap();
        assert_eq!(ids, vec!["fallback".to_string()]);
    }

    #[tokio::test]
    async fn test_set_then_get_overwrites() {
        let store = MemoryStore::new();
        let kv: &dyn KeyValueStore = &store;
        kv.set(SAVED_KEY, &vec!["a"]).await.unwrap();
        kv.set(SAVED_KEY, &vec!["b", "c"]).await.unwrap();

        let ids: Vec<String> = kv.get(SAVED_KEY, Vec::new()).await.unwrap();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(store.write_count(SAVED_KEY).await, 2);
    }

    #[tokio::test]
    async fn test_stored_null_reads_as_default() {
        let store = MemoryStore::new();
        store.set_raw(JOBS_KEY, Value::Null).await.unwrap();
        let kv: &dyn KeyValueStore = &store;
        let jobs: Option<Vec<String>> = kv.get(JOBS_KEY, None).await.unwrap();
        assert!(jobs.is_none());
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_an_error() {
        let store = MemoryStore::new();
        store.set_raw(SAVED_KEY, json!({"not": "a list"})).await.unwrap();
        let kv: &dyn KeyValueStore = &store;
        let err = kv.get::<Vec<String>>(SAVED_KEY, Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("saved_jobs"));
    }
}
