use std::sync::Arc;

use anyhow::Result;
use sl_core::ports::PhotoRecordRepositoryPort;
use sl_core::PhotoRecord;

/// List stored photo records, newest first.
pub struct ListPhotos {
    photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
}

impl ListPhotos {
    pub fn new(photo_repo: Arc<dyn PhotoRecordRepositoryPort>) -> Self {
        Self { photo_repo }
    }

    /// `limit` of `None` returns everything.
    #[tracing::instrument(name = "usecase.list_photos.execute", skip(self))]
    pub async fn execute(&self, limit: Option<usize>) -> Result<Vec<PhotoRecord>> {
        let mut records = self.photo_repo.list().await?;
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}
