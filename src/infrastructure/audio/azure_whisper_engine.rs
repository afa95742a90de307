use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::AudioFormat;

/// Whisper hosted as an Azure OpenAI deployment; replies with JSON rather than text.
pub struct AzureWhisperEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: Option<String>,
}

impl AzureWhisperEngine {
    pub fn new(
        base_url: &str,
        deployment: &str,
        api_key: &str,
        api_version: &str,
        language: Option<String>,
    ) -> Self {
        let endpoint = format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            base_url.trim_end_matches('/'),
            deployment,
            api_version,
        );
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
            language,
        }
    }
}

#[derive(Deserialize)]
struct AzureTranscriptionResponse {
    text: String,
}

#[async_trait]
impl TranscriptionEngine for AzureWhisperEngine {
    #[tracing::instrument(skip(self, audio_data), fields(bytes = audio_data.len(), mime = format.as_mime()))]
    async fn transcribe(
        &self,
        audio_data: &[u8],
        format: AudioFormat,
    ) -> Result<String, TranscriptionError> {
        let file_part = multipart::Part::bytes(audio_data.to_vec())
            .file_name(format.upload_filename())
            .mime_str(format.as_mime())
            .map_err(|e| TranscriptionError::UnsupportedFormat(e.to_string()))?;

        let mut form = multipart::Form::new().part("file", file_part);
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {status}: {body}"
            )));
        }

        let result: AzureTranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("parse response: {e}")))?;

        tracing::debug!(chars = result.text.chars().count(), "Azure Whisper transcription completed");

        Ok(result.text.trim().to_string())
    }
}
