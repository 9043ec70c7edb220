use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::thumbnail::ThumbnailCacheStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedThumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Resize + re-encode a source image into a preview whose long edge is at
/// most `size` pixels. No aspect-ratio policy is applied.
#[async_trait]
pub trait ThumbnailGeneratorPort: Send + Sync {
    async fn generate(&self, source: Vec<u8>, size: u32) -> Result<GeneratedThumbnail>;
}

/// Bytes served to the browsing UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailImage {
    /// A generated (or cached) preview.
    Preview(Vec<u8>),
    /// Generation failed; the untouched source bytes.
    Original(Vec<u8>),
}

impl ThumbnailImage {
    pub fn bytes(&self) -> &[u8] {
        match self {
            ThumbnailImage::Preview(bytes) | ThumbnailImage::Original(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ThumbnailImage::Preview(bytes) | ThumbnailImage::Original(bytes) => bytes,
        }
    }
}

#[async_trait]
pub trait ThumbnailProviderPort: Send + Sync {
    /// `Ok(None)` when the source file does not exist.
    async fn thumbnail(&self, source: &Path, size: u32) -> Result<Option<ThumbnailImage>>;

    /// Empty both tiers.
    async fn clear(&self) -> Result<()>;

    fn stats(&self) -> ThumbnailCacheStats;
}
