use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};
use crate::presentation::config::{LlmSettings, TranscriptCleaningSettings};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible `/chat/completions` client (OpenAI, LM Studio, Azure OpenAI).
pub struct ChatCompletionClient {
    client: Client,
    provider: String,
    base_url: String,
    api_version: Option<String>,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    json_mode: bool,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    /// Asks the provider for a JSON object reply. Not every local server honours it.
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        match &self.api_version {
            Some(version) => format!("{}/chat/completions?api-version={}", self.base_url, version),
            None => format!("{}/chat/completions", self.base_url),
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    #[tracing::instrument(skip_all, fields(provider = %self.provider, model = %self.model))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: self.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let request = self.client.post(self.endpoint()).json(&request_body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))
    }
}

/// Builds the controller client from the `llm` section.
pub fn create_chat_completion_client(
    settings: &LlmSettings,
) -> Result<ChatCompletionClient, LlmClientError> {
    build_client(
        settings,
        &settings.chat_model,
        settings.max_tokens,
        settings.temperature,
    )
}

/// Same provider as the controller, with the cleaning model and deterministic sampling.
pub fn create_cleaning_client(
    settings: &LlmSettings,
    cleaning: &TranscriptCleaningSettings,
) -> Result<ChatCompletionClient, LlmClientError> {
    let model = cleaning.model.as_deref().unwrap_or(&settings.chat_model);
    build_client(settings, model, cleaning.max_tokens, 0.0)
}

fn build_client(
    settings: &LlmSettings,
    model: &str,
    max_tokens: usize,
    temperature: f32,
) -> Result<ChatCompletionClient, LlmClientError> {
    let (base_url, api_version) = match settings.provider.as_str() {
        "openai" => (
            settings
                .base_url
                .as_deref()
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            None,
        ),
        "lmstudio" => (
            settings
                .base_url
                .as_deref()
                .ok_or_else(|| {
                    LlmClientError::Configuration(
                        "base_url required for lmstudio provider".to_string(),
                    )
                })?
                .trim_end_matches('/')
                .to_string(),
            None,
        ),
        "azure" => {
            let endpoint = settings.azure_endpoint.as_deref().ok_or_else(|| {
                LlmClientError::Configuration(
                    "azure_endpoint required for azure provider".to_string(),
                )
            })?;
            (
                format!(
                    "{}/openai/deployments/{}",
                    endpoint.trim_end_matches('/'),
                    model
                ),
                Some(settings.azure_api_version.clone()),
            )
        }
        other => {
            return Err(LlmClientError::Configuration(format!(
                "unknown provider: {other}"
            )));
        }
    };

    Ok(ChatCompletionClient {
        client: Client::new(),
        provider: settings.provider.clone(),
        base_url,
        api_version,
        api_key: settings.api_key.clone(),
        model: model.to_string(),
        max_tokens,
        temperature,
        json_mode: false,
    })
}
