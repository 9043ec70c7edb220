use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use sl_core::ids::PhotoRecordKey;
use sl_core::ports::PhotoRecordRepositoryPort;
use sl_core::PhotoRecord;
use tracing::debug;

/// Resolve the metadata shown next to a photo in the browse view.
///
/// Files the store has never seen are recovered from their embedded metadata
/// by the repository itself.
pub struct LookupPhoto {
    photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
}

impl LookupPhoto {
    pub fn new(photo_repo: Arc<dyn PhotoRecordRepositoryPort>) -> Self {
        Self { photo_repo }
    }

    #[tracing::instrument(name = "usecase.lookup_photo.execute", skip(self, path), fields(path = %path.display()))]
    pub async fn execute(&self, path: &Path) -> Result<Option<PhotoRecord>> {
        let record = self.photo_repo.lookup(path).await?;
        debug!(found = record.is_some(), "Photo lookup finished");
        Ok(record)
    }

    #[tracing::instrument(name = "usecase.lookup_photo.by_key", skip(self), fields(key = %key))]
    pub async fn by_key(&self, key: &PhotoRecordKey) -> Result<Option<PhotoRecord>> {
        self.photo_repo.get(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::MockPhotoRepo;
    use chrono::Utc;

    #[tokio::test]
    async fn path_lookup_delegates_to_the_store() {
        let mut repo = MockPhotoRepo::new();
        repo.expect_lookup()
            .withf(|path| path == Path::new("/photos/a.png"))
            .returning(|path| Ok(Some(PhotoRecord::new("a.png", Utc::now()).with_local_path(path))));

        let record = LookupPhoto::new(Arc::new(repo))
            .execute(Path::new("/photos/a.png"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.filename, "a.png");
    }

    #[tokio::test]
    async fn unknown_key_is_none() {
        let mut repo = MockPhotoRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let key = PhotoRecordKey::from("missing@0");
        assert!(LookupPhoto::new(Arc::new(repo)).by_key(&key).await.unwrap().is_none());
    }
}
