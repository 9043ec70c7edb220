use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::ids::PhotoRecordKey;
use crate::photo::PhotoRecord;

/// Keyed store of enriched photo records.
#[async_trait]
pub trait PhotoRecordRepositoryPort: Send + Sync {
    /// Insert `record`, or merge it into the record it matches.
    ///
    /// Returns the stored state after the write.
    async fn upsert(&self, record: PhotoRecord) -> Result<PhotoRecord>;

    /// Resolve the record for a local file, consulting embedded metadata for
    /// files this store has never seen.
    async fn lookup(&self, local_path: &Path) -> Result<Option<PhotoRecord>>;

    async fn get(&self, key: &PhotoRecordKey) -> Result<Option<PhotoRecord>>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<PhotoRecord>>;

    /// Explicit user deletion. Returns `false` when nothing was stored.
    async fn delete(&self, key: &PhotoRecordKey) -> Result<bool>;
}
