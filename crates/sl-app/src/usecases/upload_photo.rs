//! Transform a stored photo and hand it to the upload collaborator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sl_core::error::{Classify, ErrorClass};
use sl_core::ports::{
    AuthContext, ImageTransformPort, PhotoRecordRepositoryPort, PhotoUploadPort, TransformError,
    UploadError, VerificationPort, VerificationStatus,
};
use sl_core::PhotoRecord;
use tracing::{info, info_span, Instrument};

use crate::retry::{Attempt, RetryPolicy};

#[derive(Debug, thiserror::Error)]
pub enum UploadPhotoError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("uploader verification denied: {0}")]
    NotVerified(String),

    #[error("uploader verification did not settle")]
    VerificationPending,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("failed to store gallery url: {0:#}")]
    Store(anyhow::Error),
}

impl Classify for UploadPhotoError {
    fn class(&self) -> ErrorClass {
        match self {
            UploadPhotoError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorClass::NotFound
            }
            UploadPhotoError::Read { .. } | UploadPhotoError::Store(_) => ErrorClass::TransientIo,
            UploadPhotoError::Transform(err) => err.class(),
            UploadPhotoError::NotVerified(_) => ErrorClass::Fatal,
            UploadPhotoError::VerificationPending => ErrorClass::TransientIo,
            UploadPhotoError::Upload(err) => err.class(),
        }
    }
}

/// Use case for uploading one photo.
///
/// ## Behavior
/// - Reads the source file and runs the image transform off the caller's thread
/// - Polls verification status with bounded linear backoff
/// - Calls the uploader exactly once
/// - Merges the returned gallery URL into the stored record
pub struct UploadPhoto {
    transform: Arc<dyn ImageTransformPort>,
    uploader: Arc<dyn PhotoUploadPort>,
    verification: Arc<dyn VerificationPort>,
    photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
    auth: AuthContext,
    retry: RetryPolicy,
}

impl UploadPhoto {
    pub fn new(
        transform: Arc<dyn ImageTransformPort>,
        uploader: Arc<dyn PhotoUploadPort>,
        verification: Arc<dyn VerificationPort>,
        photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
        auth: AuthContext,
    ) -> Self {
        Self {
            transform,
            uploader,
            verification,
            photo_repo,
            auth,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upload the photo at `path` described by `record`; returns the record
    /// as stored after the URL merge.
    pub async fn execute(&self, record: &PhotoRecord, path: &Path) -> Result<PhotoRecord, UploadPhotoError> {
        let span = info_span!(
            "usecase.upload_photo.execute",
            key = %record.key(),
        );

        async {
            let raw = tokio::fs::read(path).await.map_err(|source| UploadPhotoError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let transformed = self.transform.process(raw).await?;
            info!(
                width = transformed.width,
                height = transformed.height,
                bytes = transformed.bytes.len(),
                mime = transformed.mime_type,
                "Photo transformed for upload"
            );

            self.await_verification().await?;

            let url = self
                .uploader
                .upload_photo(transformed.bytes, record, &self.auth)
                .await?;

            let mut with_url = record.clone();
            with_url.gallery_url = Some(url.clone());
            let stored = self
                .photo_repo
                .upsert(with_url)
                .await
                .map_err(UploadPhotoError::Store)?;

            info!(url = %url, "Photo uploaded");
            Ok(stored)
        }
        .instrument(span)
        .await
    }

    async fn await_verification(&self) -> Result<(), UploadPhotoError> {
        let verification = &self.verification;
        let auth = &self.auth;
        let settled = self
            .retry
            .run("verification_status", move |_| async move {
                match verification.verification_status(auth).await {
                    Ok(VerificationStatus::Verified) => Attempt::Done(()),
                    Ok(VerificationStatus::Pending) => Attempt::Again,
                    Ok(VerificationStatus::Denied(reason)) => {
                        Attempt::Failed(UploadPhotoError::NotVerified(reason))
                    }
                    Err(err) => Attempt::Failed(UploadPhotoError::Upload(err)),
                }
            })
            .await?;
        settled.ok_or(UploadPhotoError::VerificationPending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::*;
    use chrono::{TimeZone, Utc};
    use sl_core::ports::TransformedImage;
    use std::time::Duration;

    fn record(path: &Path) -> PhotoRecord {
        PhotoRecord::new("VRChat_a.png", Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
            .with_local_path(path)
    }

    fn transformed() -> TransformedImage {
        TransformedImage {
            bytes: vec![1, 2, 3],
            width: 1080,
            height: 608,
            mime_type: "image/jpeg",
        }
    }

    fn photo_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VRChat_a.png");
        std::fs::write(&path, b"raw").unwrap();
        (dir, path)
    }

    fn use_case(
        transform: MockTransform,
        uploader: MockUploader,
        verification: MockVerification,
        repo: MockPhotoRepo,
    ) -> UploadPhoto {
        UploadPhoto::new(
            Arc::new(transform),
            Arc::new(uploader),
            Arc::new(verification),
            Arc::new(repo),
            auth(),
        )
        .with_retry(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn uploads_once_and_merges_url() {
        let (_dir, path) = photo_file();
        let mut transform = MockTransform::new();
        transform
            .expect_process()
            .withf(|raw| raw == b"raw")
            .times(1)
            .returning(|_| Ok(transformed()));
        let mut verification = MockVerification::new();
        verification
            .expect_verification_status()
            .times(1)
            .returning(|_| Ok(VerificationStatus::Verified));
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload_photo()
            .withf(|bytes, _, auth| bytes == &vec![1, 2, 3] && auth.user_id == "usr_me")
            .times(1)
            .returning(|_, _, _| Ok("https://gallery/1".to_string()));
        let mut repo = MockPhotoRepo::new();
        repo.expect_upsert()
            .withf(|record| record.gallery_url.as_deref() == Some("https://gallery/1"))
            .times(1)
            .returning(Ok);

        let stored = use_case(transform, uploader, verification, repo)
            .execute(&record(&path), &path)
            .await
            .unwrap();

        assert_eq!(stored.gallery_url.as_deref(), Some("https://gallery/1"));
    }

    #[tokio::test]
    async fn rejected_aspect_ratio_never_reaches_uploader() {
        let (_dir, path) = photo_file();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| {
            Err(TransformError::UnsupportedAspectRatio {
                width: 1600,
                height: 1200,
                ratio: 4.0 / 3.0,
            })
        });
        let mut uploader = MockUploader::new();
        uploader.expect_upload_photo().never();

        let err = use_case(transform, uploader, MockVerification::new(), MockPhotoRepo::new())
            .execute(&record(&path), &path)
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::ValidationFailed);
    }

    #[tokio::test]
    async fn pending_verification_is_polled_until_settled() {
        let (_dir, path) = photo_file();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| Ok(transformed()));
        let mut verification = MockVerification::new();
        let mut seq = mockall::Sequence::new();
        verification
            .expect_verification_status()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(VerificationStatus::Pending));
        verification
            .expect_verification_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(VerificationStatus::Verified));
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload_photo()
            .times(1)
            .returning(|_, _, _| Ok("file:///outbox/a.jpg".to_string()));
        let mut repo = MockPhotoRepo::new();
        repo.expect_upsert().returning(Ok);

        assert!(use_case(transform, uploader, verification, repo)
            .execute(&record(&path), &path)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn transient_verification_failure_surfaces_after_three_attempts() {
        let (_dir, path) = photo_file();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| Ok(transformed()));
        let mut verification = MockVerification::new();
        verification
            .expect_verification_status()
            .times(3)
            .returning(|_| Err(UploadError::Transient("503".to_string())));
        let mut uploader = MockUploader::new();
        uploader.expect_upload_photo().never();

        let err = use_case(transform, uploader, verification, MockPhotoRepo::new())
            .execute(&record(&path), &path)
            .await
            .unwrap_err();

        assert!(matches!(err, UploadPhotoError::Upload(UploadError::Transient(_))));
    }

    #[tokio::test]
    async fn upload_transport_is_single_shot() {
        let (_dir, path) = photo_file();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| Ok(transformed()));
        let mut verification = MockVerification::new();
        verification
            .expect_verification_status()
            .returning(|_| Ok(VerificationStatus::Verified));
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload_photo()
            .times(1)
            .returning(|_, _, _| Err(UploadError::Transient("reset".to_string())));

        let err = use_case(transform, uploader, verification, MockPhotoRepo::new())
            .execute(&record(&path), &path)
            .await
            .unwrap_err();

        assert!(err.class().is_retryable());
    }

    #[tokio::test]
    async fn missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");

        let err = use_case(
            MockTransform::new(),
            MockUploader::new(),
            MockVerification::new(),
            MockPhotoRepo::new(),
        )
        .execute(&record(&path), &path)
        .await
        .unwrap_err();

        assert_eq!(err.class(), ErrorClass::NotFound);
    }
}
