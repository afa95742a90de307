mod in_memory_repository;
mod pg_phase_score_repository;
mod pg_session_repository;

pub use in_memory_repository::{InMemoryPhaseScoreRepository, InMemorySessionRepository};
pub use pg_phase_score_repository::PgPhaseScoreRepository;
pub use pg_session_repository::PgSessionRepository;
