use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionId;

/// Bucket for transmissions made on the wrong frequency, kept apart from
/// the phase the student was attempting.
pub const FREQUENCY_USAGE_ERROR_PHASE: &str = "frequency_usage_error";

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseScore {
    pub id: Uuid,
    pub session_id: SessionId,
    pub user_id: Option<Uuid>,
    pub phase_id: String,
    pub score: f64,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PhaseScore {
    pub fn new(
        session_id: SessionId,
        user_id: Option<Uuid>,
        phase_id: impl Into<String>,
        score: f64,
        feedback: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            user_id,
            phase_id: phase_id.into(),
            score: score.clamp(0.0, 100.0),
            feedback,
            created_at: Utc::now(),
        }
    }

    pub fn frequency_usage_error(
        session_id: SessionId,
        user_id: Option<Uuid>,
        feedback: Option<String>,
    ) -> Self {
        Self::new(session_id, user_id, FREQUENCY_USAGE_ERROR_PHASE, 0.0, feedback)
    }
}
