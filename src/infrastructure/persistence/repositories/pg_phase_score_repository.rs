use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::application::ports::{PhaseScoreRepository, RepositoryError};
use crate::domain::PhaseScore;

pub struct PgPhaseScoreRepository {
    pool: PgPool,
}

impl PgPhaseScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhaseScoreRepository for PgPhaseScoreRepository {
    #[instrument(skip(self, score), fields(session_id = %score.session_id, phase_id = %score.phase_id, score = score.score))]
    async fn record(&self, score: &PhaseScore) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO phase_scores (id, session_id, user_id, phase_id, score, feedback, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(score.id)
        .bind(score.session_id.as_uuid())
        .bind(score.user_id)
        .bind(&score.phase_id)
        .bind(score.score)
        .bind(&score.feedback)
        .bind(score.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
