use async_trait::async_trait;
use thiserror::Error;

use crate::error::{Classify, ErrorClass};

/// Output of the upload transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported aspect ratio {width}x{height} ({ratio:.4}); expected 16:9 or 9:16")]
    UnsupportedAspectRatio { width: u32, height: u32, ratio: f64 },

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("transform worker failed: {0}")]
    Worker(String),
}

impl Classify for TransformError {
    fn class(&self) -> ErrorClass {
        match self {
            TransformError::Decode(_) | TransformError::UnsupportedAspectRatio { .. } => {
                ErrorClass::ValidationFailed
            }
            TransformError::Encode(_) | TransformError::Worker(_) => ErrorClass::Fatal,
        }
    }
}

/// Decode, validate, resize and re-encode a screenshot for upload.
///
/// Runs off the caller's context; every step aborts the pipeline on failure.
#[async_trait]
pub trait ImageTransformPort: Send + Sync {
    async fn process(&self, raw: Vec<u8>) -> Result<TransformedImage, TransformError>;
}
