use std::path::PathBuf;

use anyhow::Result;
use sl_core::ports::NewPhotoHandler;
use tokio::sync::mpsc;

/// [`NewPhotoHandler`] that forwards paths over a bounded channel.
///
/// Lets the background host report new photos to the interactive context
/// without sharing the ingest pipeline across runtimes.
pub struct ChannelPhotoForwarder {
    tx: mpsc::Sender<PathBuf>,
}

impl ChannelPhotoForwarder {
    pub fn new(tx: mpsc::Sender<PathBuf>) -> Self {
        Self { tx }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PathBuf>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait::async_trait]
impl NewPhotoHandler for ChannelPhotoForwarder {
    async fn on_new_photo(&self, path: PathBuf) -> Result<()> {
        self.tx
            .send(path)
            .await
            .map_err(|err| anyhow::anyhow!("photo receiver closed: {}", err.0.display()))
    }
}
