use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use sl_core::ports::{EmbeddedMetadataOutcome, EmbeddedMetadataPort};

use super::embedded_parser::{parse_embedded, ParseOutcome, METADATA_FIELD};
use crate::png::ChunkTextExtractor;

/// Bytes read from the head of a file. Text chunks sit before pixel data.
pub const DEFAULT_PREFIX_BYTES: u64 = 256 * 1024;
/// Files whose outcome is remembered at once.
pub const DEFAULT_CACHED_FILES: usize = 4096;

/// Latest outcome per path, keyed by the modification time it was read at.
///
/// A newer modification time replaces the entry; past `capacity` paths the
/// oldest inserted path is forgotten.
struct OutcomeCache {
    entries: HashMap<PathBuf, (i64, EmbeddedMetadataOutcome)>,
    order: VecDeque<PathBuf>,
    capacity: usize,
}

impl OutcomeCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, path: &Path, mtime_ms: i64) -> Option<EmbeddedMetadataOutcome> {
        self.entries
            .get(path)
            .filter(|(cached_mtime, _)| *cached_mtime == mtime_ms)
            .map(|(_, outcome)| outcome.clone())
    }

    fn insert(&mut self, path: PathBuf, mtime_ms: i64, outcome: EmbeddedMetadataOutcome) {
        if self.entries.insert(path.clone(), (mtime_ms, outcome)).is_some() {
            return;
        }
        self.order.push_back(path);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Reads embedded producer metadata from screenshot files.
///
/// Outcomes (including "nothing here") are cached per path and modification
/// time, so an unchanged file is only scanned once.
pub struct EmbeddedMetadataReader {
    extractor: ChunkTextExtractor,
    prefix_bytes: u64,
    cache: Mutex<OutcomeCache>,
}

impl EmbeddedMetadataReader {
    pub fn new() -> Self {
        Self::with_prefix_bytes(DEFAULT_PREFIX_BYTES)
    }

    pub fn with_prefix_bytes(prefix_bytes: u64) -> Self {
        Self {
            extractor: ChunkTextExtractor::new(METADATA_FIELD),
            prefix_bytes,
            cache: Mutex::new(OutcomeCache::new(DEFAULT_CACHED_FILES)),
        }
    }

    pub fn with_cache_capacity(mut self, files: usize) -> Self {
        self.cache = Mutex::new(OutcomeCache::new(files));
        self
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn read_prefix(&self, path: &Path) -> Result<Vec<u8>> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("open {}", path.display()))?;
        let mut prefix = Vec::new();
        file.take(self.prefix_bytes)
            .read_to_end(&mut prefix)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        Ok(prefix)
    }

    async fn scan(&self, path: &Path) -> Result<EmbeddedMetadataOutcome> {
        let prefix = self.read_prefix(path).await?;
        let extractor = self.extractor.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let Some(text) = extractor.extract(&prefix) else {
                return EmbeddedMetadataOutcome::NotApplicable;
            };
            match parse_embedded(&text) {
                ParseOutcome::Parsed(meta) => EmbeddedMetadataOutcome::Found(meta.into_session()),
                ParseOutcome::ForeignProducer => EmbeddedMetadataOutcome::NotApplicable,
                ParseOutcome::Malformed => EmbeddedMetadataOutcome::Malformed,
            }
        })
        .await
        .context("embedded metadata worker")?;

        Ok(outcome)
    }
}

impl Default for EmbeddedMetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

async fn modified_ms(path: &Path) -> Option<i64> {
    let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(std::time::UNIX_EPOCH).ok()?;
    i64::try_from(since_epoch.as_millis()).ok()
}

#[async_trait]
impl EmbeddedMetadataPort for EmbeddedMetadataReader {
    async fn read_embedded(&self, path: &Path) -> EmbeddedMetadataOutcome {
        let Some(mtime_ms) = modified_ms(path).await else {
            return EmbeddedMetadataOutcome::NotApplicable;
        };
        if let Some(cached) = self.cache.lock().await.get(path, mtime_ms) {
            return cached;
        }

        let outcome = match self.scan(path).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Embedded metadata scan failed");
                // Not cached: the file may still be being written.
                return EmbeddedMetadataOutcome::NotApplicable;
            }
        };

        debug!(
            path = %path.display(),
            found = outcome.is_found(),
            "Embedded metadata scanned"
        );
        self.cache
            .lock()
            .await
            .insert(path.to_path_buf(), mtime_ms, outcome.clone());
        outcome
    }
}
