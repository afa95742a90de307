use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::TransmissionService;

#[derive(Clone)]
pub struct AppState {
    pub transmission_service: Arc<TransmissionService>,
    /// Directory served under `/media` when readbacks are stored locally.
    pub media_root: Option<PathBuf>,
    pub max_upload_bytes: usize,
}
