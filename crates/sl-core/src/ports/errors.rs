use thiserror::Error;

use crate::error::{Classify, ErrorClass};

#[derive(Debug, Error)]
pub enum AppDirsError {
    #[error("platform data directory is unavailable")]
    DataLocalDirUnavailable,

    #[error("platform cache directory is unavailable")]
    CacheDirUnavailable,
}

impl Classify for AppDirsError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }
}
