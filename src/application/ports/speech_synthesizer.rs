use async_trait::async_trait;

/// Text wrapped in the speech markup envelope, with the voice it is meant for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechMarkup {
    pub ssml: String,
    pub voice: String,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Mono 16-bit linear PCM at [`SpeechSynthesizer::sample_rate`].
    async fn synthesize(&self, markup: &SpeechMarkup) -> Result<Vec<i16>, SynthesisError>;

    fn sample_rate(&self) -> u32;
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("empty audio returned")]
    EmptyAudio,
    #[error("invalid audio: {0}")]
    InvalidAudio(String),
}
