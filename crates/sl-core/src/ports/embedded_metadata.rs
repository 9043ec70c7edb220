use std::path::Path;

use async_trait::async_trait;

use crate::photo::SessionMetadata;

/// Result of reading metadata embedded in an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedMetadataOutcome {
    /// A recognised payload; fields that failed to decode are simply absent.
    Found(SessionMetadata),
    /// No text chunk, another producer, or a file that is not a container.
    NotApplicable,
    /// A text chunk was present but did not decode as a payload.
    Malformed,
}

impl EmbeddedMetadataOutcome {
    pub fn into_session(self) -> Option<SessionMetadata> {
        match self {
            EmbeddedMetadataOutcome::Found(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, EmbeddedMetadataOutcome::Found(_))
    }
}

/// Reads session metadata stored inside a screenshot by a third-party tool.
///
/// Never fails; unreadable files report [`EmbeddedMetadataOutcome::NotApplicable`].
#[async_trait]
pub trait EmbeddedMetadataPort: Send + Sync {
    async fn read_embedded(&self, path: &Path) -> EmbeddedMetadataOutcome;
}
