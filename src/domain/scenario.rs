use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::frequency_group::{FrequencyMap, deserialize_frequency_map};
use super::{FrequencyGroup, Phase, PhaseMap};

/// A scripted training flight: its phases, radio frequencies and the shared
/// values (wind, squawk, taxi route) phases may reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_frequency_group: Option<FrequencyGroup>,
    #[serde(
        default,
        deserialize_with = "deserialize_frequency_map",
        skip_serializing_if = "FrequencyMap::is_empty"
    )]
    pub frequencies: FrequencyMap,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub shared: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scenario {
    /// Phases keyed by id. Phases without an id are unreachable and skipped;
    /// on duplicate ids the later definition wins.
    pub fn phase_map(&self) -> PhaseMap {
        self.phases
            .iter()
            .filter(|phase| !phase.id.trim().is_empty())
            .map(|phase| (phase.id.clone(), phase.clone()))
            .collect()
    }

    pub fn first_phase_id(&self) -> Option<&str> {
        self.phases
            .iter()
            .map(|phase| phase.id.as_str())
            .find(|id| !id.trim().is_empty())
    }

    pub fn frequency_for(&self, group: &FrequencyGroup) -> Option<&str> {
        self.frequencies.get(group).map(String::as_str)
    }
}
