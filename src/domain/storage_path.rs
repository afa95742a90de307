use std::fmt;

use uuid::Uuid;

use super::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// Fresh object key for a synthesized controller readback.
    pub fn readback(session_id: &SessionId) -> Self {
        Self(format!(
            "sessions/{}/readback-{}.wav",
            session_id,
            Uuid::new_v4().simple()
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
