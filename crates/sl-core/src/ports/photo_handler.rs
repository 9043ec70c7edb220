//! New-photo handler port
//!
//! The platform watcher calls this for every screenshot path that passed the
//! dedup filter. The app layer implements it.

use std::path::PathBuf;

use anyhow::Result;

#[async_trait::async_trait]
pub trait NewPhotoHandler: Send + Sync {
    /// Called once per newly detected screenshot.
    async fn on_new_photo(&self, path: PathBuf) -> Result<()>;
}
