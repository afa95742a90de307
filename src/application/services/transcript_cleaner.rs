use std::sync::Arc;

use crate::application::ports::LlmClient;

const CLEANING_SYSTEM_PROMPT: &str = r#"Eres un experto en fraseología aeronáutica. Tu única tarea es corregir la transcripción de audio de un piloto o controlador.

REGLAS:
1. Convierte números a dígitos individuales escritos en palabras (ej: "10" -> "uno cero", "3000" -> "tres mil").
2. Corrige términos aeronáuticos mal interpretados.
3. NO agregues puntuación, saludos ni explicaciones.
4. Devuelve SOLAMENTE el texto corregido.

Ejemplos:
Input: "ascender a 10 mil pies"
Output: "ascender a uno cero mil pies"

Input: "pista 10"
Output: "pista uno cero"

Input: "rumbo 3 6 0"
Output: "rumbo tres seis cero"

Input: "al.de espera"
Output: "al punto de espera"
"#;

/// Best-effort rewrite of raw speech-to-text output into aviation
/// phraseology. Never fails: any problem keeps the raw transcript.
pub struct TranscriptCleaner {
    llm_client: Arc<dyn LlmClient>,
}

impl TranscriptCleaner {
    pub fn new(llm_client: Arc<dyn LlmClient>) -> Self {
        Self { llm_client }
    }

    pub async fn clean(&self, transcript: &str) -> String {
        if transcript.trim().is_empty() {
            return transcript.to_string();
        }

        match self
            .llm_client
            .complete(CLEANING_SYSTEM_PROMPT, transcript)
            .await
        {
            Ok(cleaned) if !cleaned.trim().is_empty() => cleaned.trim().to_string(),
            Ok(_) => transcript.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Transcript cleaning failed, keeping raw transcript");
                transcript.to_string()
            }
        }
    }
}
