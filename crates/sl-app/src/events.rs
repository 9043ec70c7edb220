//! Notifications for the browsing UI.

use std::path::PathBuf;

use sl_core::{ErrorClass, PhotoRecord};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A new screenshot was enriched and stored.
    Processed { record: PhotoRecord },

    /// The photo was refused by content policy (aspect ratio, undecodable).
    Rejected {
        path: PathBuf,
        reason: String,
    },

    /// The upload collaborator ended with an error after retries.
    UploadFailed {
        path: PathBuf,
        reason: String,
        class: ErrorClass,
    },

    /// The upload collaborator accepted the photo.
    Uploaded { record: PhotoRecord, url: String },

    /// The watcher could not start or reported a problem.
    WatcherError { message: String },
}

/// Non-blocking sender for [`PipelineEvent`]s.
///
/// Events are dropped when nobody listens or the channel is full; the
/// pipeline never waits for the UI.
#[derive(Clone, Default)]
pub struct PipelineEvents {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl PipelineEvents {
    pub fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PipelineEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sender that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.tx {
            if let Err(err) = tx.try_send(event) {
                debug!(error = %err, "Pipeline event dropped");
            }
        }
    }
}
