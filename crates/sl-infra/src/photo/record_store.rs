//! Photo record store: key-value persistence plus an in-memory index.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use sl_core::ids::PhotoRecordKey;
use sl_core::photo::{PhotoRecord, ScreenshotName};
use sl_core::ports::{EmbeddedMetadataOutcome, EmbeddedMetadataPort, KeyValueStorePort, PhotoRecordRepositoryPort};

pub const RECORD_KEY_PREFIX: &str = "photo:";
pub const INDEX_KEY: &str = "photos:index";

type PendingLookup = Arc<OnceCell<Option<PhotoRecord>>>;

#[derive(Default)]
struct RecordIndex {
    records: BTreeMap<PhotoRecordKey, PhotoRecord>,
    by_path: HashMap<PathBuf, PhotoRecordKey>,
    by_filename: HashMap<String, PhotoRecordKey>,
}

impl RecordIndex {
    fn insert(&mut self, record: PhotoRecord) {
        let key = record.key();
        if let Some(previous) = self.records.get(&key) {
            if let Some(old_path) = &previous.local_path {
                self.by_path.remove(old_path);
            }
        }
        if let Some(path) = &record.local_path {
            self.by_path.insert(path.clone(), key.clone());
        }
        self.by_filename.insert(record.filename.clone(), key.clone());
        self.records.insert(key, record);
    }

    fn remove(&mut self, key: &PhotoRecordKey) -> Option<PhotoRecord> {
        let record = self.records.remove(key)?;
        if let Some(path) = &record.local_path {
            self.by_path.remove(path);
        }
        if self.by_filename.get(&record.filename) == Some(key) {
            self.by_filename.remove(&record.filename);
        }
        Some(record)
    }

    /// Ordered match strategies, first hit wins: exact key, local path,
    /// filename fragment.
    ///
    /// The fragment strategy never pairs two records that point at different
    /// local files.
    fn find_match(&self, incoming: &PhotoRecord) -> Option<&PhotoRecord> {
        if let Some(record) = self.records.get(&incoming.key()) {
            return Some(record);
        }
        if let Some(record) = incoming
            .local_path
            .as_ref()
            .and_then(|path| self.by_path.get(path))
            .and_then(|key| self.records.get(key))
        {
            return Some(record);
        }
        let fragment = filename_stem(&incoming.filename);
        self.records.values().find(|record| {
            let distinct_files = matches!(
                (&record.local_path, &incoming.local_path),
                (Some(existing), Some(new)) if existing != new
            );
            !distinct_files && record.matches_filename_fragment(fragment)
        })
    }

    fn find_by_path(&self, path: &Path) -> Option<&PhotoRecord> {
        if let Some(record) = self.by_path.get(path).and_then(|key| self.records.get(key)) {
            return Some(record);
        }
        let file_name = path.file_name()?.to_str()?;
        self.by_filename
            .get(file_name)
            .and_then(|key| self.records.get(key))
    }
}

fn filename_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(filename)
}

fn storage_key(key: &PhotoRecordKey) -> String {
    format!("{RECORD_KEY_PREFIX}{key}")
}

/// Keyed store of enriched photo records.
///
/// Writes go through to the key-value store and update the index before
/// `upsert` returns, so reads right after a write observe it. Lookups for
/// files the store has never seen fall back to embedded metadata and persist
/// what they find; concurrent lookups of one path share that extraction.
pub struct PhotoRecordStore {
    kv: Arc<dyn KeyValueStorePort>,
    embedded: Arc<dyn EmbeddedMetadataPort>,
    index: Mutex<RecordIndex>,
    loaded: OnceCell<()>,
    pending: Mutex<HashMap<PathBuf, PendingLookup>>,
}

impl PhotoRecordStore {
    pub fn new(kv: Arc<dyn KeyValueStorePort>, embedded: Arc<dyn EmbeddedMetadataPort>) -> Self {
        Self {
            kv,
            embedded,
            index: Mutex::new(RecordIndex::default()),
            loaded: OnceCell::new(),
            pending: Mutex::new(HashMap::new()),
        }
    }

    async fn ensure_loaded(&self) -> Result<()> {
        self.loaded
            .get_or_try_init(|| async {
                let keys = self.kv.get_list(INDEX_KEY).await.context("load photo index")?;
                let mut index = self.index.lock().await;
                for key in keys {
                    let Some(bytes) = self.kv.get(&format!("{RECORD_KEY_PREFIX}{key}")).await? else {
                        warn!(key = %key, "Indexed photo record is missing");
                        continue;
                    };
                    match serde_json::from_slice::<PhotoRecord>(&bytes) {
                        Ok(record) => index.insert(record),
                        Err(err) => warn!(key = %key, error = %err, "Skipping corrupt photo record"),
                    }
                }
                info!(records = index.records.len(), "Photo index loaded");
                Ok::<_, anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    async fn persist_index(&self, index: &RecordIndex) -> Result<()> {
        let keys: Vec<String> = index.records.keys().map(|k| k.to_string()).collect();
        self.kv
            .set_list(INDEX_KEY, &keys)
            .await
            .context("write photo index")
    }

    async fn extract_and_store(&self, path: &Path) -> Result<Option<PhotoRecord>> {
        let session = match self.embedded.read_embedded(path).await {
            EmbeddedMetadataOutcome::Found(session) => session,
            EmbeddedMetadataOutcome::NotApplicable | EmbeddedMetadataOutcome::Malformed => {
                return Ok(None)
            }
        };

        let Some(filename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(None);
        };
        let taken_at = match ScreenshotName::from_path(path) {
            Some(name) => name.taken_at(),
            None => file_modified_at(path).await.unwrap_or_else(Utc::now),
        };

        let record = PhotoRecord::new(filename, taken_at)
            .with_local_path(path)
            .with_session(session);
        debug!(path = %path.display(), "Recovered photo record from embedded metadata");
        self.upsert(record).await.map(Some)
    }
}

async fn file_modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

#[async_trait]
impl PhotoRecordRepositoryPort for PhotoRecordStore {
    async fn upsert(&self, record: PhotoRecord) -> Result<PhotoRecord> {
        self.ensure_loaded().await?;
        let mut index = self.index.lock().await;

        let (stored, is_new) = match index.find_match(&record) {
            Some(existing) => {
                let mut merged = existing.clone();
                if !merged.merge_from(&record) {
                    return Ok(merged);
                }
                (merged, false)
            }
            None => (record, true),
        };

        let json = serde_json::to_vec(&stored).context("serialize photo record")?;
        self.kv
            .set(&storage_key(&stored.key()), &json)
            .await
            .context("write photo record")?;

        index.insert(stored.clone());
        if is_new {
            self.persist_index(&index).await?;
        }
        debug!(key = %stored.key(), new = is_new, "Photo record stored");
        Ok(stored)
    }

    async fn lookup(&self, local_path: &Path) -> Result<Option<PhotoRecord>> {
        self.ensure_loaded().await?;
        if let Some(record) = self.index.lock().await.find_by_path(local_path) {
            return Ok(Some(record.clone()));
        }

        let cell = {
            let mut pending = self.pending.lock().await;
            pending.entry(local_path.to_path_buf()).or_default().clone()
        };

        let result = cell
            .get_or_try_init(|| self.extract_and_store(local_path))
            .await
            .cloned();

        let mut pending = self.pending.lock().await;
        if pending
            .get(local_path)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            pending.remove(local_path);
        }
        result
    }

    async fn get(&self, key: &PhotoRecordKey) -> Result<Option<PhotoRecord>> {
        self.ensure_loaded().await?;
        Ok(self.index.lock().await.records.get(key).cloned())
    }

    async fn list(&self) -> Result<Vec<PhotoRecord>> {
        self.ensure_loaded().await?;
        let mut records: Vec<PhotoRecord> = self.index.lock().await.records.values().cloned().collect();
        records.sort_by(|a, b| {
            b.taken_at
                .cmp(&a.taken_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(records)
    }

    async fn delete(&self, key: &PhotoRecordKey) -> Result<bool> {
        self.ensure_loaded().await?;
        let mut index = self.index.lock().await;
        if index.remove(key).is_none() {
            return Ok(false);
        }
        self.kv
            .remove(&storage_key(key))
            .await
            .context("remove photo record")?;
        self.persist_index(&index).await?;
        info!(key = %key, "Photo record deleted");
        Ok(true)
    }
}
