use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use sl_core::ports::{ThumbnailGeneratorPort, ThumbnailImage, ThumbnailProviderPort};
use sl_core::thumbnail::{ThumbnailCacheStats, ThumbnailKey};

use super::disk_tier::DiskTier;
use super::memory_tier::MemoryTier;

type InFlight = Arc<OnceCell<Option<Vec<u8>>>>;

/// Two-tier thumbnail cache: bounded memory LRU in front of a disk directory.
///
/// Concurrent misses for one key share a single generation.
pub struct ThumbnailCache {
    memory: Mutex<MemoryTier>,
    disk: DiskTier,
    generator: Arc<dyn ThumbnailGeneratorPort>,
    in_flight: tokio::sync::Mutex<HashMap<ThumbnailKey, InFlight>>,
    hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
}

impl ThumbnailCache {
    pub fn new(
        generator: Arc<dyn ThumbnailGeneratorPort>,
        disk: DiskTier,
        max_entries: usize,
        max_bytes: usize,
    ) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::new(max_entries, max_bytes)),
            disk,
            generator,
            in_flight: tokio::sync::Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            disk_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn memory(&self) -> MutexGuard<'_, MemoryTier> {
        self.memory.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Disk tier, then generation. `None` when no preview could be produced.
    async fn load_or_generate(&self, key: &ThumbnailKey, source: &Path, size: u32) -> Option<Vec<u8>> {
        match self.disk.get(key).await {
            Ok(Some(bytes)) => {
                self.disk_hits.fetch_add(1, Ordering::Relaxed);
                self.memory().put(key.clone(), bytes.clone());
                return Some(bytes);
            }
            Ok(None) => {}
            Err(err) => warn!(key = %key, error = %err, "Thumbnail disk tier read failed"),
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let source_bytes = match tokio::fs::read(source).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %source.display(), error = %err, "Thumbnail source unreadable");
                return None;
            }
        };

        let generated = match self.generator.generate(source_bytes, size).await {
            Ok(generated) => generated,
            Err(err) => {
                warn!(path = %source.display(), error = %err, "Thumbnail generation failed");
                return None;
            }
        };

        if let Err(err) = self.disk.put(key, &generated.bytes).await {
            warn!(key = %key, error = %err, "Thumbnail disk tier write failed");
        }
        self.memory().put(key.clone(), generated.bytes.clone());
        debug!(key = %key, bytes = generated.bytes.len(), "Thumbnail generated");
        Some(generated.bytes)
    }

    async fn coalesced(&self, key: &ThumbnailKey, source: &Path, size: u32) -> Option<Vec<u8>> {
        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(key.clone()).or_default().clone()
        };

        let result = cell
            .get_or_init(|| self.load_or_generate(key, source, size))
            .await
            .clone();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(key).is_some_and(|current| Arc::ptr_eq(current, &cell)) {
            in_flight.remove(key);
        }
        result
    }
}

async fn source_mtime_ms(source: &Path) -> Result<Option<i64>> {
    let metadata = match tokio::fs::metadata(source).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("stat {}", source.display())),
    };
    if !metadata.is_file() {
        return Ok(None);
    }
    let modified = metadata
        .modified()
        .with_context(|| format!("modification time of {}", source.display()))?;
    let millis = modified
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default();
    Ok(Some(millis))
}

#[async_trait]
impl ThumbnailProviderPort for ThumbnailCache {
    async fn thumbnail(&self, source: &Path, size: u32) -> Result<Option<ThumbnailImage>> {
        let Some(mtime_ms) = source_mtime_ms(source).await? else {
            return Ok(None);
        };
        let key = ThumbnailKey::for_source(source, mtime_ms, size);

        let cached = self.memory().get(&key);
        if let Some(bytes) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(ThumbnailImage::Preview(bytes)));
        }

        if let Some(bytes) = self.coalesced(&key, source, size).await {
            return Ok(Some(ThumbnailImage::Preview(bytes)));
        }

        match tokio::fs::read(source).await {
            Ok(original) => Ok(Some(ThumbnailImage::Original(original))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read {}", source.display())),
        }
    }

    async fn clear(&self) -> Result<()> {
        self.memory().clear();
        self.disk.clear().await
    }

    fn stats(&self) -> ThumbnailCacheStats {
        let memory = self.memory();
        ThumbnailCacheStats {
            entries: memory.len(),
            bytes: memory.total_bytes(),
            max_entries: memory.max_entries(),
            max_bytes: memory.max_bytes(),
            hits: self.hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
