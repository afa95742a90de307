use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FrequencyGroup;

pub type PhaseMap = BTreeMap<String, Phase>;

/// One step of a training scenario.
///
/// Fields the trainer does not interpret are kept in `extra` so the phase
/// can be handed back to the model exactly as the scenario author wrote it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<FrequencyGroup>,
    #[serde(default, skip_serializing_if = "PhaseTransitions::is_empty")]
    pub transitions: PhaseTransitions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmGuidance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerSection>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runway_human: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Phase {
    pub fn expected_intent(&self) -> Option<&str> {
        non_blank(self.intent.as_deref())
    }

    /// Usable frequency group, ignoring scenario placeholders.
    pub fn frequency_group(&self) -> Option<&FrequencyGroup> {
        self.frequency.as_ref().filter(|group| !group.is_placeholder())
    }

    /// Persona text authored for this phase, `llm.role` first.
    pub fn controller_role(&self) -> Option<&str> {
        self.llm
            .as_ref()
            .and_then(|llm| non_blank(llm.role.as_deref()))
            .or_else(|| {
                self.controller
                    .as_ref()
                    .and_then(|c| non_blank(c.role.as_deref()))
            })
    }

    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransitions {
    #[serde(rename = "onSuccess", default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<Value>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl PhaseTransitions {
    pub fn is_empty(&self) -> bool {
        self.on_success.is_none() && self.success.is_none() && self.other.is_empty()
    }

    /// Target of the success outcome; `onSuccess` wins over the legacy `success` key.
    pub fn on_success_target(&self) -> Option<&str> {
        let on_success = self.on_success.as_ref().and_then(Value::as_str);
        let success = self.success.as_ref().and_then(Value::as_str);
        non_blank(on_success).or_else(|| non_blank(success))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmGuidance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_checklist: Option<GuidanceText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_checklist: Option<GuidanceText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_response_rules: Option<GuidanceText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_guidance: Option<GuidanceText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scenario guidance can be written as a single sentence or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuidanceText {
    Single(String),
    Items(Vec<Value>),
}

impl GuidanceText {
    pub fn items(&self) -> Vec<String> {
        match self {
            GuidanceText::Single(text) => vec![text.clone()],
            GuidanceText::Items(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            GuidanceText::Single(text) => text.is_empty(),
            GuidanceText::Items(items) => items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
