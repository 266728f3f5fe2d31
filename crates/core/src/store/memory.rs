//! In-memory key-value store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use super::KvStore;
use crate::Error;

/// Process-local [`KvStore`] backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), Error> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, Error> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries.remove(key).is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<u64, Error> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_roundtrip_and_remove() {
        let store = MemoryStore::new();
        store.put("a", json!(1)).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
        assert!(store.remove("a").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_prefix() {
        let store = MemoryStore::new();
        store.put("analysis_1", json!(1)).await.unwrap();
        store.put("analysis_2", json!(2)).await.unwrap();
        store.put("perplexity_api_key", json!("k")).await.unwrap();

        assert_eq!(store.clear_prefix("analysis_").await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.keys("").await.unwrap(), vec!["perplexity_api_key".to_string()]);
    }
}
