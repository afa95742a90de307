use async_trait::async_trait;
use reqwest::Client;

use crate::application::ports::{SpeechMarkup, SpeechSynthesizer, SynthesisError};
use crate::presentation::config::SpeechSettings;

const OUTPUT_FORMAT: &str = "raw-16khz-16bit-mono-pcm";
const OUTPUT_SAMPLE_RATE: u32 = 16_000;
const USER_AGENT: &str = "radio-coach";

/// Azure Cognitive Services text-to-speech over REST, returning raw PCM.
pub struct AzureSpeechSynthesizer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AzureSpeechSynthesizer {
    pub fn new(region: &str, api_key: &str, endpoint: Option<&str>) -> Self {
        let endpoint = endpoint
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1")
            });
        Self {
            client: Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        }
    }

    pub fn from_settings(settings: &SpeechSettings) -> Self {
        Self::new(
            &settings.region,
            &settings.api_key,
            settings.endpoint.as_deref(),
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSpeechSynthesizer {
    #[tracing::instrument(skip_all, fields(voice = %markup.voice))]
    async fn synthesize(&self, markup: &SpeechMarkup) -> Result<Vec<i16>, SynthesisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .body(markup.ssml.clone())
            .send()
            .await
            .map_err(|e| SynthesisError::ApiRequestFailed(format!("request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ApiRequestFailed(format!(
                "status {status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::ApiRequestFailed(format!("body: {e}")))?;

        let samples = decode_pcm16_le(&audio)?;
        tracing::debug!(samples = samples.len(), "Speech synthesized");
        Ok(samples)
    }

    fn sample_rate(&self) -> u32 {
        OUTPUT_SAMPLE_RATE
    }
}

pub(crate) fn decode_pcm16_le(audio: &[u8]) -> Result<Vec<i16>, SynthesisError> {
    if audio.is_empty() {
        return Err(SynthesisError::EmptyAudio);
    }
    if audio.len() % 2 != 0 {
        return Err(SynthesisError::InvalidAudio(format!(
            "odd byte count {} for 16-bit PCM",
            audio.len()
        )));
    }
    Ok(audio
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}
