use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use sl_core::ports::KeyValueStorePort;

/// Process-local key-value store for tests and ephemeral profiles.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStorePort for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_list(&self, key: &str) -> Result<Vec<String>> {
        match self.entries.read().await.get(key) {
            Some(bytes) => serde_json::from_slice(bytes)
                .with_context(|| format!("decode list stored under {key}")),
            None => Ok(Vec::new()),
        }
    }

    async fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        let bytes = serde_json::to_vec(values).context("encode list")?;
        self.set(key, &bytes).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bytes_and_lists() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert!(store.get_list("l").await.unwrap().is_empty());

        store.set("a", b"1").await.unwrap();
        store
            .set_list("l", &["x".to_string(), "y".to_string()])
            .await
            .unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get_list("l").await.unwrap(), vec!["x", "y"]);

        store.remove("a").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
