use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Radio channel role a phase expects the student to be tuned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FrequencyGroup {
    #[default]
    Tower,
    Ground,
    Approach,
    Radar,
    Other(String),
}

impl FrequencyGroup {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tower" => Self::Tower,
            "ground" => Self::Ground,
            "approach" => Self::Approach,
            "radar" => Self::Radar,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Tower => "tower",
            Self::Ground => "ground",
            Self::Approach => "approach",
            Self::Radar => "radar",
            Self::Other(name) => name,
        }
    }

    /// Scenarios use `"unknown"` (or an empty string) as a placeholder group.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Other(name) if name.is_empty() || name == "unknown")
    }
}

impl From<String> for FrequencyGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for FrequencyGroup {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<FrequencyGroup> for String {
    fn from(group: FrequencyGroup) -> Self {
        group.as_str().to_string()
    }
}

impl fmt::Display for FrequencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type FrequencyMap = BTreeMap<FrequencyGroup, String>;

/// Scenario files write frequencies either as strings or as bare numbers.
pub(crate) fn deserialize_frequency_map<'de, D>(deserializer: D) -> Result<FrequencyMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<FrequencyGroup, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(group, value)| match value {
            Value::String(s) => Some((group, s)),
            Value::Number(n) => Some((group, n.to_string())),
            _ => None,
        })
        .collect())
}
