//! Abstract persistence collaborator.

use anyhow::Result;
use async_trait::async_trait;

/// Byte-oriented key-value store with string-list helpers.
///
/// Writes are whole-value replacements; readers never observe a partially
/// written value.
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns an empty list when the key is absent.
    async fn get_list(&self, key: &str) -> Result<Vec<String>>;

    async fn set_list(&self, key: &str, values: &[String]) -> Result<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
