use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{PhaseScoreRepository, RepositoryError, SessionRepository};
use crate::domain::{PhaseScore, SessionId, SessionState};

/// Process-local session store for `session_store.provider = "memory"`.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, SessionState>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self, session_id: SessionId) -> Result<Option<SessionState>, RepositoryError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn save(&self, session_id: SessionId, state: &SessionState) -> Result<(), RepositoryError> {
        self.sessions.write().await.insert(session_id, state.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPhaseScoreRepository {
    scores: RwLock<Vec<PhaseScore>>,
}

impl InMemoryPhaseScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores recorded for `session_id`, oldest first.
    pub async fn list_by_session(&self, session_id: SessionId) -> Vec<PhaseScore> {
        self.scores
            .read()
            .await
            .iter()
            .filter(|score| score.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PhaseScoreRepository for InMemoryPhaseScoreRepository {
    async fn record(&self, score: &PhaseScore) -> Result<(), RepositoryError> {
        self.scores.write().await.push(score.clone());
        Ok(())
    }
}
