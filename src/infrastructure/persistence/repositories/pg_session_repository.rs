use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use crate::application::ports::{RepositoryError, SessionRepository};
use crate::domain::{SessionId, SessionState};

/// Session documents as one JSONB row per session in `training_contexts`.
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self), fields(session_id = %session_id))]
    async fn load(&self, session_id: SessionId) -> Result<Option<SessionState>, RepositoryError> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT context FROM training_contexts WHERE session_id = $1")
                .bind(session_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let Some((Json(document),)) = row else {
            return Ok(None);
        };
        match serde_json::from_value::<SessionState>(document) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::warn!(error = %e, "Stored session document is unreadable, starting fresh");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, state), fields(session_id = %session_id, turns = state.turns.len()))]
    async fn save(&self, session_id: SessionId, state: &SessionState) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO training_contexts (session_id, context, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (session_id)
            DO UPDATE SET context = EXCLUDED.context, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(Json(state))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
