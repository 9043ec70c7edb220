use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use sl_core::thumbnail::ThumbnailKey;

/// Persistent thumbnail directory, one file per key.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written thumbnail.
pub struct DiskTier {
    dir: PathBuf,
}

impl DiskTier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ThumbnailKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub async fn get(&self, key: &ThumbnailKey) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read thumbnail {}", path.display())),
        }
    }

    pub async fn put(&self, key: &ThumbnailKey, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create thumbnail dir {}", self.dir.display()))?;

        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("write thumbnail {}", tmp.display()))?;
        if let Err(err) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err).with_context(|| format!("publish thumbnail {}", target.display()));
        }
        Ok(())
    }

    /// Delete and recreate the directory.
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("remove thumbnail dir {}", self.dir.display()))
            }
        }
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("recreate thumbnail dir {}", self.dir.display()))
    }
}
