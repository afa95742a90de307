use async_trait::async_trait;

use crate::domain::{SessionId, SessionState};

use super::RepositoryError;

/// Whole-document store for session state; `save` replaces the previous
/// document (last write wins).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load(&self, session_id: SessionId) -> Result<Option<SessionState>, RepositoryError>;

    async fn save(&self, session_id: SessionId, state: &SessionState)
    -> Result<(), RepositoryError>;
}
