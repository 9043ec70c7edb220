use async_trait::async_trait;

use crate::photo::SessionMetadata;

/// Best-effort view of the session the producer is currently in.
///
/// Implementations never fail: a missing log, an unreadable directory or a
/// log without a session marker all produce [`SessionMetadata::empty`].
#[async_trait]
pub trait SessionContextPort: Send + Sync {
    async fn current_session(&self) -> SessionMetadata;
}
