mod audio_store;
mod llm_client;
mod phase_score_repository;
mod repository_error;
mod scenario_catalog;
mod session_repository;
mod speech_synthesizer;
mod transcription_engine;

pub use audio_store::{AudioStore, AudioStoreError};
pub use llm_client::{LlmClient, LlmClientError};
pub use phase_score_repository::PhaseScoreRepository;
pub use repository_error::RepositoryError;
pub use scenario_catalog::ScenarioCatalog;
pub use session_repository::SessionRepository;
pub use speech_synthesizer::{SpeechMarkup, SpeechSynthesizer, SynthesisError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
