use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};

use super::prompt_sanitizer::sanitize_prompt;
use super::{ContractViolation, PromptBundle, StructuredResponse};

pub const DEFAULT_CONTRACT_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct LlmOutcome {
    pub response: StructuredResponse,
    pub raw_response: String,
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("response contract not met after {attempts} attempts: {last_violation}")]
    Exhausted {
        attempts: u32,
        last_violation: ContractViolation,
    },
    #[error("llm invocation failed: {0}")]
    Invocation(#[from] LlmClientError),
}

/// Calls the controller model and only returns schema-valid replies.
///
/// Malformed or empty output is retried up to `max_retries` extra times.
/// Transport errors are returned immediately.
pub struct ControllerLlm {
    llm_client: Arc<dyn LlmClient>,
    max_retries: u32,
}

impl ControllerLlm {
    pub fn new(llm_client: Arc<dyn LlmClient>, max_retries: u32) -> Self {
        Self {
            llm_client,
            max_retries,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    #[tracing::instrument(skip(self, bundle), fields(intent = %bundle.intent, frequency_group = %bundle.frequency_group))]
    pub async fn invoke(&self, bundle: &PromptBundle) -> Result<LlmOutcome, ContractError> {
        let max_attempts = self.max_attempts();
        let mut last_violation = ContractViolation::EmptyResponse;

        for attempt in 1..=max_attempts {
            let raw_response = self
                .llm_client
                .complete(&bundle.system_prompt, &bundle.user_prompt)
                .await?;

            match StructuredResponse::from_model_output(&raw_response) {
                Ok(response) => {
                    if !response.intent.is_empty() && response.intent != bundle.intent {
                        tracing::info!(
                            expected = %bundle.intent,
                            returned = %response.intent,
                            "Model returned a different intent"
                        );
                    }
                    return Ok(LlmOutcome {
                        response,
                        raw_response,
                        attempts: attempt,
                    });
                }
                Err(violation) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        violation = %violation,
                        raw = %sanitize_prompt(&raw_response),
                        "Model reply rejected by response contract"
                    );
                    last_violation = violation;
                }
            }
        }

        Err(ContractError::Exhausted {
            attempts: max_attempts,
            last_violation,
        })
    }
}
