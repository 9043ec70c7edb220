//! `mockall` doubles for the ports the use cases depend on.

use std::path::Path;

use async_trait::async_trait;
use mockall::mock;
use sl_core::ids::PhotoRecordKey;
use sl_core::photo::{PhotoRecord, SessionMetadata};
use sl_core::ports::*;
use sl_core::thumbnail::ThumbnailCacheStats;
use sl_core::WatchConfig;

mock! {
    pub SessionContext {}

    #[async_trait]
    impl SessionContextPort for SessionContext {
        async fn current_session(&self) -> SessionMetadata;
    }
}

mock! {
    pub Embedded {}

    #[async_trait]
    impl EmbeddedMetadataPort for Embedded {
        async fn read_embedded(&self, path: &Path) -> EmbeddedMetadataOutcome;
    }
}

mock! {
    pub PhotoRepo {}

    #[async_trait]
    impl PhotoRecordRepositoryPort for PhotoRepo {
        async fn upsert(&self, record: PhotoRecord) -> anyhow::Result<PhotoRecord>;
        async fn lookup(&self, local_path: &Path) -> anyhow::Result<Option<PhotoRecord>>;
        async fn get(&self, key: &PhotoRecordKey) -> anyhow::Result<Option<PhotoRecord>>;
        async fn list(&self) -> anyhow::Result<Vec<PhotoRecord>>;
        async fn delete(&self, key: &PhotoRecordKey) -> anyhow::Result<bool>;
    }
}

mock! {
    pub Transform {}

    #[async_trait]
    impl ImageTransformPort for Transform {
        async fn process(&self, raw: Vec<u8>) -> Result<TransformedImage, TransformError>;
    }
}

mock! {
    pub Uploader {}

    #[async_trait]
    impl PhotoUploadPort for Uploader {
        async fn upload_photo(
            &self,
            bytes: Vec<u8>,
            record: &PhotoRecord,
            auth: &AuthContext,
        ) -> Result<String, UploadError>;
    }
}

mock! {
    pub Verification {}

    #[async_trait]
    impl VerificationPort for Verification {
        async fn verification_status(&self, auth: &AuthContext) -> Result<VerificationStatus, UploadError>;
    }
}

mock! {
    pub Thumbnails {}

    #[async_trait]
    impl ThumbnailProviderPort for Thumbnails {
        async fn thumbnail(&self, source: &Path, size: u32) -> anyhow::Result<Option<ThumbnailImage>>;
        async fn clear(&self) -> anyhow::Result<()>;
        fn stats(&self) -> ThumbnailCacheStats;
    }
}

mock! {
    pub WatcherControl {}

    #[async_trait]
    impl WatcherControlPort for WatcherControl {
        async fn start_watcher(&self, config: WatchConfig) -> Result<(), WatcherControlError>;
        async fn stop_watcher(&self) -> Result<(), WatcherControlError>;
        async fn apply_config(&self, config: WatchConfig) -> Result<(), WatcherControlError>;
    }
}

pub fn auth() -> AuthContext {
    AuthContext {
        user_id: "usr_me".to_string(),
        token: "token".to_string(),
    }
}
