//! External upload collaborator.
//!
//! The transport is a single-shot call from this side; retries happen only
//! around [`VerificationPort::verification_status`].

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{Classify, ErrorClass};
use crate::photo::PhotoRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    /// Verification has not settled yet; ask again later.
    Pending,
    Denied(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("transient upload failure: {0}")]
    Transient(String),

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("not authorized to upload")]
    Unauthorized,

    #[error("upload service unavailable: {0}")]
    Unavailable(String),
}

impl Classify for UploadError {
    fn class(&self) -> ErrorClass {
        match self {
            UploadError::Transient(_) | UploadError::Unavailable(_) => ErrorClass::TransientIo,
            UploadError::Rejected(_) => ErrorClass::ValidationFailed,
            UploadError::Unauthorized => ErrorClass::Fatal,
        }
    }
}

#[async_trait]
pub trait PhotoUploadPort: Send + Sync {
    /// Upload the transformed bytes; returns the remote gallery URL.
    async fn upload_photo(
        &self,
        bytes: Vec<u8>,
        record: &PhotoRecord,
        auth: &AuthContext,
    ) -> Result<String, UploadError>;
}

#[async_trait]
pub trait VerificationPort: Send + Sync {
    async fn verification_status(&self, auth: &AuthContext) -> Result<VerificationStatus, UploadError>;
}
