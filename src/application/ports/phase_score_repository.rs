use async_trait::async_trait;

use crate::domain::PhaseScore;

use super::RepositoryError;

#[async_trait]
pub trait PhaseScoreRepository: Send + Sync {
    async fn record(&self, score: &PhaseScore) -> Result<(), RepositoryError>;
}
