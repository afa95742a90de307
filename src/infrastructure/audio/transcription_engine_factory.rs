use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::presentation::config::{TranscriptionProviderSetting, TranscriptionSettings};

use super::azure_whisper_engine::AzureWhisperEngine;
use super::openai_whisper_engine::OpenAiWhisperEngine;

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        settings: &TranscriptionSettings,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            TranscriptionError::Configuration("transcription api_key is not configured".into())
        })?;

        match settings.provider {
            TranscriptionProviderSetting::OpenAi => Ok(Arc::new(OpenAiWhisperEngine::new(
                api_key,
                settings.base_url.clone(),
                settings.model.clone(),
                settings.language.clone(),
            ))),
            TranscriptionProviderSetting::Azure => {
                let base_url = settings.base_url.as_deref().ok_or_else(|| {
                    TranscriptionError::Configuration(
                        "base_url is required for Azure Whisper".into(),
                    )
                })?;
                let deployment = settings
                    .azure_deployment
                    .as_deref()
                    .unwrap_or(&settings.model);
                Ok(Arc::new(AzureWhisperEngine::new(
                    base_url,
                    deployment,
                    &api_key,
                    &settings.azure_api_version,
                    settings.language.clone(),
                )))
            }
        }
    }
}
