use std::sync::Arc;

use anyhow::Result;
use sl_core::ids::PhotoRecordKey;
use sl_core::ports::PhotoRecordRepositoryPort;
use tracing::info;

/// Remove a photo record on user request. The image file is left alone.
pub struct DeletePhoto {
    photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
}

impl DeletePhoto {
    pub fn new(photo_repo: Arc<dyn PhotoRecordRepositoryPort>) -> Self {
        Self { photo_repo }
    }

    #[tracing::instrument(name = "usecase.delete_photo.execute", skip(self), fields(key = %key))]
    pub async fn execute(&self, key: &PhotoRecordKey) -> Result<bool> {
        let removed = self.photo_repo.delete(key).await?;
        info!(removed, "Photo record delete finished");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::MockPhotoRepo;

    #[tokio::test]
    async fn reports_whether_anything_was_removed() {
        let mut repo = MockPhotoRepo::new();
        repo.expect_delete()
            .withf(|key| key.as_str() == "a.png@0")
            .returning(|_| Ok(true));

        let removed = DeletePhoto::new(Arc::new(repo))
            .execute(&PhotoRecordKey::from("a.png@0"))
            .await
            .unwrap();

        assert!(removed);
    }
}
