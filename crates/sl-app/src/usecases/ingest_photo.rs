use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sl_core::error::{Classify, ErrorClass};
use sl_core::ports::{
    EmbeddedMetadataPort, NewPhotoHandler, PhotoRecordRepositoryPort, SessionContextPort,
};
use sl_core::{PhotoRecord, ScreenshotName, SessionMetadata};
use tracing::{info, info_span, warn, Instrument};

use super::upload_photo::UploadPhoto;
use crate::deps::AppDeps;
use crate::events::{PipelineEvent, PipelineEvents};

/// Combine the live log session with metadata embedded in the file.
///
/// Embedded data describes the moment of capture, so it wins. The live
/// session only fills gaps when it describes the same world; a photo copied
/// in from another session keeps its embedded context alone.
pub fn combine_sessions(live: SessionMetadata, embedded: Option<SessionMetadata>) -> SessionMetadata {
    let Some(embedded) = embedded else {
        return live;
    };
    let same_world = match (&embedded.world, &live.world) {
        (Some(captured), Some(current)) => captured.id == current.id,
        (None, _) => true,
        (Some(_), None) => false,
    };
    if same_world {
        embedded.merged_with(&live)
    } else {
        embedded
    }
}

/// Use case for a newly detected screenshot.
///
/// Enriches the photo with session context, stores it and, when an upload
/// collaborator is configured, uploads it. Per-photo upload failures are
/// reported as [`PipelineEvent`]s and never fail the ingest.
pub struct IngestPhoto {
    session_context: Arc<dyn SessionContextPort>,
    embedded_metadata: Arc<dyn EmbeddedMetadataPort>,
    photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
    upload: Option<UploadPhoto>,
    events: PipelineEvents,
}

impl IngestPhoto {
    pub fn new(
        session_context: Arc<dyn SessionContextPort>,
        embedded_metadata: Arc<dyn EmbeddedMetadataPort>,
        photo_repo: Arc<dyn PhotoRecordRepositoryPort>,
        events: PipelineEvents,
    ) -> Self {
        Self {
            session_context,
            embedded_metadata,
            photo_repo,
            upload: None,
            events,
        }
    }

    pub fn from_deps(deps: &AppDeps, events: PipelineEvents) -> Self {
        Self::new(
            deps.session_context.clone(),
            deps.embedded_metadata.clone(),
            deps.photo_repo.clone(),
            events,
        )
    }

    pub fn with_upload(mut self, upload: UploadPhoto) -> Self {
        self.upload = Some(upload);
        self
    }

    pub async fn execute(&self, path: &Path) -> Result<PhotoRecord> {
        let span = info_span!("usecase.ingest_photo.execute", path = %path.display());

        async {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", path.display()))?;
            let taken_at = capture_time(path).await;

            let (live, embedded) = tokio::join!(
                self.session_context.current_session(),
                self.embedded_metadata.read_embedded(path),
            );
            let from_file = embedded.is_found();
            let session = combine_sessions(live, embedded.into_session());

            let record = PhotoRecord::new(filename, taken_at)
                .with_local_path(path)
                .with_session(session);
            let stored = self
                .photo_repo
                .upsert(record)
                .await
                .context("store photo record")?;

            info!(
                key = %stored.key(),
                world = stored.world.as_ref().map(|w| w.id.as_str()).unwrap_or(""),
                players = stored.players.len(),
                embedded = from_file,
                "Photo ingested"
            );
            self.events.emit(PipelineEvent::Processed {
                record: stored.clone(),
            });

            let Some(upload) = &self.upload else {
                return Ok(stored);
            };
            match upload.execute(&stored, path).await {
                Ok(updated) => {
                    if let Some(url) = updated.gallery_url.clone() {
                        self.events.emit(PipelineEvent::Uploaded {
                            record: updated.clone(),
                            url,
                        });
                    }
                    Ok(updated)
                }
                Err(err) => {
                    let class = err.class();
                    warn!(error = %err, class = %class, "Photo upload did not complete");
                    let event = if class == ErrorClass::ValidationFailed {
                        PipelineEvent::Rejected {
                            path: path.to_path_buf(),
                            reason: err.to_string(),
                        }
                    } else {
                        PipelineEvent::UploadFailed {
                            path: path.to_path_buf(),
                            reason: err.to_string(),
                            class,
                        }
                    };
                    self.events.emit(event);
                    Ok(stored)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Capture time from the screenshot filename, else the file's modification
/// time, else now.
async fn capture_time(path: &Path) -> DateTime<Utc> {
    if let Some(name) = ScreenshotName::from_path(path) {
        return name.taken_at();
    }
    match tokio::fs::metadata(path).await.and_then(|meta| meta.modified()) {
        Ok(modified) => DateTime::<Utc>::from(modified),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "No capture time available, using now");
            Utc::now()
        }
    }
}

#[async_trait]
impl NewPhotoHandler for IngestPhoto {
    async fn on_new_photo(&self, path: PathBuf) -> Result<()> {
        self.execute(&path).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::usecases::test_support::*;
    use sl_core::ports::{
        EmbeddedMetadataOutcome, TransformError, TransformedImage, UploadError,
        VerificationStatus,
    };
    use sl_core::{Identity, WorldDescriptor};
    use std::time::Duration;

    const SHOT: &str = "VRChat_2024-01-01_12-00-00.000_1920x1080.png";

    fn session(world_id: &str, player: (&str, &str)) -> SessionMetadata {
        SessionMetadata {
            world: Some(WorldDescriptor::new("World", world_id)),
            players: vec![Identity::new(player.0, player.1)].into(),
        }
    }

    fn live(world_id: &str) -> MockSessionContext {
        let session = session(world_id, ("usr_live", "Live"));
        let mut context = MockSessionContext::new();
        context
            .expect_current_session()
            .returning(move || session.clone());
        context
    }

    fn embedded(outcome: EmbeddedMetadataOutcome) -> MockEmbedded {
        let mut embedded = MockEmbedded::new();
        embedded
            .expect_read_embedded()
            .returning(move |_| outcome.clone());
        embedded
    }

    fn echo_repo() -> MockPhotoRepo {
        let mut repo = MockPhotoRepo::new();
        repo.expect_upsert().returning(Ok);
        repo
    }

    fn ingest(
        context: MockSessionContext,
        embedded: MockEmbedded,
        repo: MockPhotoRepo,
        events: PipelineEvents,
    ) -> IngestPhoto {
        IngestPhoto::new(Arc::new(context), Arc::new(embedded), Arc::new(repo), events)
    }

    #[test]
    fn embedded_wins_and_live_roster_joins_for_same_world() {
        let combined = combine_sessions(
            session("wrld_1", ("usr_live", "Live")),
            Some(session("wrld_1", ("usr_file", "File"))),
        );
        assert_eq!(combined.players.len(), 2);
    }

    #[test]
    fn live_session_is_ignored_for_a_different_world() {
        let combined = combine_sessions(
            session("wrld_live", ("usr_live", "Live")),
            Some(session("wrld_file", ("usr_file", "File"))),
        );
        assert_eq!(combined.world.unwrap().id, "wrld_file");
        assert!(!combined.players.contains("usr_live"));
    }

    #[test]
    fn without_embedded_data_the_live_session_is_used() {
        let combined = combine_sessions(session("wrld_live", ("usr_live", "Live")), None);
        assert_eq!(combined.world.unwrap().id, "wrld_live");
    }

    #[tokio::test]
    async fn stores_enriched_record_and_reports_it() {
        let (events, mut rx) = PipelineEvents::channel(8);
        let use_case = ingest(
            live("wrld_1"),
            embedded(EmbeddedMetadataOutcome::NotApplicable),
            echo_repo(),
            events,
        );
        let path = PathBuf::from("/photos/2024-01").join(SHOT);

        let record = use_case.execute(&path).await.unwrap();

        assert_eq!(record.filename, SHOT);
        assert_eq!(record.taken_at, ScreenshotName::parse(SHOT).unwrap().taken_at());
        assert_eq!(record.local_path.as_deref(), Some(path.as_path()));
        assert_eq!(record.world.as_ref().unwrap().id, "wrld_1");
        assert_eq!(rx.try_recv().unwrap(), PipelineEvent::Processed { record });
    }

    #[tokio::test]
    async fn non_screenshot_names_fall_back_to_file_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday.png");
        std::fs::write(&path, b"x").unwrap();
        let use_case = ingest(
            live("wrld_1"),
            embedded(EmbeddedMetadataOutcome::Malformed),
            echo_repo(),
            PipelineEvents::disabled(),
        );

        let record = use_case.execute(&path).await.unwrap();

        let modified: DateTime<Utc> = std::fs::metadata(&path).unwrap().modified().unwrap().into();
        assert_eq!(record.taken_at, modified);
    }

    #[tokio::test]
    async fn storage_failure_fails_the_ingest() {
        let mut repo = MockPhotoRepo::new();
        repo.expect_upsert()
            .returning(|_| Err(anyhow::anyhow!("disk full")));
        let use_case = ingest(
            live("wrld_1"),
            embedded(EmbeddedMetadataOutcome::NotApplicable),
            repo,
            PipelineEvents::disabled(),
        );

        assert!(use_case.execute(Path::new(SHOT)).await.is_err());
    }

    fn photo_on_disk() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SHOT);
        std::fs::write(&path, b"raw").unwrap();
        (dir, path)
    }

    fn upload(transform: MockTransform, uploader: MockUploader) -> UploadPhoto {
        let mut verification = MockVerification::new();
        verification
            .expect_verification_status()
            .returning(|_| Ok(VerificationStatus::Verified));
        UploadPhoto::new(
            Arc::new(transform),
            Arc::new(uploader),
            Arc::new(verification),
            Arc::new(echo_repo()),
            auth(),
        )
        .with_retry(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn rejected_photo_is_reported_but_still_stored() {
        let (_dir, path) = photo_on_disk();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| {
            Err(TransformError::UnsupportedAspectRatio {
                width: 1600,
                height: 1200,
                ratio: 4.0 / 3.0,
            })
        });
        let (events, mut rx) = PipelineEvents::channel(8);
        let use_case = ingest(
            live("wrld_1"),
            embedded(EmbeddedMetadataOutcome::NotApplicable),
            echo_repo(),
            events,
        )
        .with_upload(upload(transform, MockUploader::new()));

        let record = use_case.execute(&path).await.unwrap();

        assert!(record.gallery_url.is_none());
        assert!(matches!(rx.try_recv().unwrap(), PipelineEvent::Processed { .. }));
        match rx.try_recv().unwrap() {
            PipelineEvent::Rejected { path: rejected, reason } => {
                assert_eq!(rejected, path);
                assert!(reason.contains("aspect"), "{reason}");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_failure_is_reported_with_its_class() {
        let (_dir, path) = photo_on_disk();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| {
            Ok(TransformedImage {
                bytes: vec![1],
                width: 1080,
                height: 608,
                mime_type: "image/jpeg",
            })
        });
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload_photo()
            .returning(|_, _, _| Err(UploadError::Unavailable("offline".to_string())));
        let (events, mut rx) = PipelineEvents::channel(8);
        let use_case = ingest(
            live("wrld_1"),
            embedded(EmbeddedMetadataOutcome::NotApplicable),
            echo_repo(),
            events,
        )
        .with_upload(upload(transform, uploader));

        use_case.on_new_photo(path.clone()).await.unwrap();

        rx.try_recv().unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            PipelineEvent::UploadFailed { class: ErrorClass::TransientIo, .. }
        ));
    }

    #[tokio::test]
    async fn successful_upload_reports_the_url() {
        let (_dir, path) = photo_on_disk();
        let mut transform = MockTransform::new();
        transform.expect_process().returning(|_| {
            Ok(TransformedImage {
                bytes: vec![1],
                width: 1080,
                height: 608,
                mime_type: "image/jpeg",
            })
        });
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload_photo()
            .returning(|_, _, _| Ok("file:///outbox/shot.jpg".to_string()));
        let (events, mut rx) = PipelineEvents::channel(8);
        let use_case = ingest(
            live("wrld_1"),
            embedded(EmbeddedMetadataOutcome::NotApplicable),
            echo_repo(),
            events,
        )
        .with_upload(upload(transform, uploader));

        let record = use_case.execute(&path).await.unwrap();

        assert_eq!(record.gallery_url.as_deref(), Some("file:///outbox/shot.jpg"));
        rx.try_recv().unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            PipelineEvent::Uploaded { url, .. } if url == "file:///outbox/shot.jpg"
        ));
    }
}
