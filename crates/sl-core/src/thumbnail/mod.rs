//! Thumbnail cache keys and diagnostics.

use std::path::Path;

/// Deterministic fingerprint of a cached thumbnail.
///
/// A changed source file gets a new modification time and therefore a new
/// key, so stale entries are never served; they simply age out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThumbnailKey {
    pub stem: String,
    pub mtime_ms: i64,
    pub size: u32,
    pub extension: String,
}

impl ThumbnailKey {
    pub fn new(stem: impl Into<String>, mtime_ms: i64, size: u32, extension: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            mtime_ms,
            size,
            extension: extension.into(),
        }
    }

    /// Key for `source` at the given modification time and requested size.
    ///
    /// The extension is taken from the source file, lowercased.
    pub fn for_source(source: &Path, mtime_ms: i64, size: u32) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = source
            .extension()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Self::new(stem, mtime_ms, size, extension)
    }

    /// File name used by the disk tier.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            format!("{}_{}_{}", self.stem, self.mtime_ms, self.size)
        } else {
            format!("{}_{}_{}.{}", self.stem, self.mtime_ms, self.size, self.extension)
        }
    }
}

impl std::fmt::Display for ThumbnailKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Point-in-time counters of the memory tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailCacheStats {
    pub entries: usize,
    pub bytes: usize,
    pub max_entries: usize,
    pub max_bytes: usize,
    pub hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_source_path() {
        let key = ThumbnailKey::for_source(
            Path::new("/photos/2024-01/VRChat_2024-01-01_12-00-00.000_1920x1080.PNG"),
            1_704_110_400_000,
            256,
        );
        assert_eq!(key.stem, "VRChat_2024-01-01_12-00-00.000_1920x1080");
        assert_eq!(key.extension, "png");
        assert_eq!(
            key.file_name(),
            "VRChat_2024-01-01_12-00-00.000_1920x1080_1704110400000_256.png"
        );
    }

    #[test]
    fn modified_source_changes_key() {
        let path = Path::new("/photos/a.png");
        assert_ne!(
            ThumbnailKey::for_source(path, 1, 256),
            ThumbnailKey::for_source(path, 2, 256)
        );
        assert_ne!(
            ThumbnailKey::for_source(path, 1, 256),
            ThumbnailKey::for_source(path, 1, 512)
        );
    }
}
