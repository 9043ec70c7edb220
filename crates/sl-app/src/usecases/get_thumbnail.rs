use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use sl_core::ports::{ThumbnailImage, ThumbnailProviderPort};
use sl_core::thumbnail::ThumbnailCacheStats;
use tracing::{debug, info};

/// Use case for serving browse-view thumbnails.
///
/// `None` means the source file does not exist. When the source exists the
/// caller always gets bytes back, either a preview or the original file.
pub struct GetThumbnail {
    thumbnails: Arc<dyn ThumbnailProviderPort>,
    default_size: u32,
}

impl GetThumbnail {
    pub fn new(thumbnails: Arc<dyn ThumbnailProviderPort>, default_size: u32) -> Self {
        Self {
            thumbnails,
            default_size: default_size.max(1),
        }
    }

    #[tracing::instrument(name = "usecase.get_thumbnail.execute", skip(self, path), fields(path = %path.display()))]
    pub async fn execute(&self, path: &Path, size: Option<u32>) -> Result<Option<ThumbnailImage>> {
        let size = size.filter(|s| *s > 0).unwrap_or(self.default_size);
        let image = self.thumbnails.thumbnail(path, size).await?;
        if let Some(ThumbnailImage::Original(_)) = &image {
            debug!(size, "Serving original bytes in place of a preview");
        }
        Ok(image)
    }

    pub fn stats(&self) -> ThumbnailCacheStats {
        self.thumbnails.stats()
    }

    #[tracing::instrument(name = "usecase.get_thumbnail.clear", skip(self))]
    pub async fn clear(&self) -> Result<()> {
        self.thumbnails.clear().await?;
        info!("Thumbnail cache cleared");
        Ok(())
    }
}
