//! Upload collaborator that publishes into a local outbox directory.
//!
//! Each upload writes the transformed image and the record JSON side by side
//! and answers with a `file://` URL. A sync agent (or a person) picks the
//! files up from there.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use sl_core::photo::PhotoRecord;
use sl_core::ports::{AuthContext, PhotoUploadPort, UploadError, VerificationPort, VerificationStatus};

pub struct OutboxUploader {
    dir: PathBuf,
}

impl OutboxUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_atomically(&self, target: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        let tmp = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        if let Err(err) = fs::rename(&tmp, target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err).with_context(|| format!("publish {}", target.display()));
        }
        Ok(())
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn extension_for(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "jpg",
        Ok(image::ImageFormat::Png) => "png",
        Ok(image::ImageFormat::WebP) => "webp",
        Ok(image::ImageFormat::Avif) => "avif",
        _ => "bin",
    }
}

fn has_credentials(auth: &AuthContext) -> bool {
    !auth.user_id.trim().is_empty() && !auth.token.trim().is_empty()
}

#[async_trait]
impl PhotoUploadPort for OutboxUploader {
    async fn upload_photo(
        &self,
        bytes: Vec<u8>,
        record: &PhotoRecord,
        auth: &AuthContext,
    ) -> Result<String, UploadError> {
        if !has_credentials(auth) {
            return Err(UploadError::Unauthorized);
        }
        if bytes.is_empty() {
            return Err(UploadError::Rejected("empty image payload".to_string()));
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Unavailable(format!("{}: {e}", self.dir.display())))?;

        let base = sanitize(&record.key().to_string());
        let image_path = self.dir.join(format!("{base}.{}", extension_for(&bytes)));
        let record_json = serde_json::to_vec_pretty(record)
            .map_err(|e| UploadError::Rejected(format!("unserializable record: {e}")))?;

        self.write_atomically(&image_path, &bytes)
            .await
            .map_err(|e| UploadError::Transient(format!("{e:#}")))?;
        self.write_atomically(&self.dir.join(format!("{base}.json")), &record_json)
            .await
            .map_err(|e| UploadError::Transient(format!("{e:#}")))?;

        let url = format!("file://{}", image_path.display());
        info!(user_id = %auth.user_id, url = %url, "Photo placed in outbox");
        Ok(url)
    }
}

#[async_trait]
impl VerificationPort for OutboxUploader {
    async fn verification_status(&self, auth: &AuthContext) -> Result<VerificationStatus, UploadError> {
        if !has_credentials(auth) {
            return Ok(VerificationStatus::Denied("missing user id or token".to_string()));
        }
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Transient(format!("{}: {e}", self.dir.display())))?;
        Ok(VerificationStatus::Verified)
    }
}
