use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Meteo, TurnRole, lenient};

/// One radio exchange stored in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_f64", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_f64", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub allow_response: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub llm_raw: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub meteo: Option<Meteo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Value>,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            frequency: None,
            intent: None,
            confidence: None,
            score: None,
            feedback: None,
            allow_response: None,
            phase_id: None,
            metadata: Map::new(),
            llm_raw: None,
            meteo: None,
            route: None,
            timestamp: Utc::now(),
        }
    }

    pub fn student(text: impl Into<String>, frequency: impl Into<String>) -> Self {
        Self {
            frequency: Some(frequency.into()),
            ..Self::new(TurnRole::Student, text)
        }
    }

    pub fn controller(text: impl Into<String>, feedback: impl Into<String>, allow_response: bool) -> Self {
        Self {
            feedback: Some(feedback.into()),
            allow_response: Some(allow_response),
            ..Self::new(TurnRole::Controller, text)
        }
    }
}
