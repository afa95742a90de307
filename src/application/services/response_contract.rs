use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::lenient;

use super::phase_transition::next_phase_hint;

/// Validated controller reply. Nothing downstream reads model output except
/// through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResponse {
    pub intent: String,
    #[serde(alias = "allow_response", deserialize_with = "lenient_bool")]
    pub allow_response: bool,
    #[serde(default, alias = "controller_text")]
    pub controller_text: Option<String>,
    #[serde(rename = "feedback", alias = "feedback_text", default, deserialize_with = "null_as_empty")]
    pub feedback_text: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub metadata: Map<String, Value>,
}

/// Why a model reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("empty response")]
    EmptyResponse,
    #[error("malformed json: {0}")]
    MalformedJson(String),
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

impl StructuredResponse {
    pub fn from_model_output(raw: &str) -> Result<Self, ContractViolation> {
        if raw.trim().is_empty() {
            return Err(ContractViolation::EmptyResponse);
        }

        let payload = extract_json_payload(raw);
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ContractViolation::MalformedJson(e.to_string()))?;

        let mut response: StructuredResponse = serde_json::from_value(value)
            .map_err(|e| ContractViolation::SchemaViolation(e.to_string()))?;
        response.confidence = response.confidence.map(|c| c.clamp(0.0, 1.0));
        response.score = response.score.map(|s| s.clamp(0.0, 100.0));
        Ok(response)
    }

    /// Suggested next phase from `metadata.nextPhase` or `metadata.next_phase`.
    pub fn next_phase_hint(&self) -> Option<&str> {
        next_phase_hint(&self.metadata)
    }
}

/// Strips Markdown fences and narrows the text to the outermost braces.
pub fn extract_json_payload(payload: &str) -> &str {
    let mut cleaned = payload.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => &cleaned[start..=end],
        _ => cleaned,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => lenient::value_as_f64(&value)
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {value}"))),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("expected a boolean, got {value}"))),
        },
        _ => Err(serde::de::Error::custom(format!("expected a boolean, got {value}"))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
