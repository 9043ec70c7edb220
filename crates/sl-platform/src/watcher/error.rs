use std::path::PathBuf;

use sl_core::error::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("watch directory unavailable: {}", .0.display())]
    DirectoryUnavailable(PathBuf),

    #[error("failed to subscribe to {}: {message}", .path.display())]
    Subscribe { path: PathBuf, message: String },

    #[error("watcher runtime has stopped")]
    AlreadyStopped,
}

impl Classify for WatcherError {
    fn class(&self) -> ErrorClass {
        match self {
            WatcherError::DirectoryUnavailable(_) => ErrorClass::NotFound,
            WatcherError::Subscribe { .. } => ErrorClass::TransientIo,
            WatcherError::AlreadyStopped => ErrorClass::Fatal,
        }
    }
}
