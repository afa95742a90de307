use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::dynamic_assignments::{
    generate_qnh, generate_squawk, generate_taxi_route, generate_wind_direction,
    generate_wind_speed, remember,
};
use super::frequency_group::{FrequencyMap, deserialize_frequency_map};
use super::{Difficulty, DynamicAssignments, FrequencyGroup, Meteo, Scenario, Turn, TurnHistory};
use super::lenient;

/// Persisted per-session training document.
///
/// A missing record is equivalent to `SessionState::default()`. Keys written
/// by other tools are carried through `extra` untouched, and fields of the
/// wrong shape read as absent instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub scenario_overrides: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub default_frequency_group: Option<FrequencyGroup>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub active_frequency_group: Option<FrequencyGroup>,
    #[serde(
        default,
        deserialize_with = "deserialize_frequency_map",
        skip_serializing_if = "FrequencyMap::is_empty"
    )]
    pub frequencies: FrequencyMap,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub meteo: Option<Meteo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Value>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub squawk: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub transponder: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub taxi_route: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub student: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub dynamic_assignments: DynamicAssignments,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub session_completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub turns: TurnHistory,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionState {
    /// Fills squawk, taxi route, wind and QNH the first time a session is
    /// used. Values already present on the session are kept and memoized.
    pub fn ensure_dynamic_assignments<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let assignments = &mut self.dynamic_assignments;

        let squawk = remember(&mut self.squawk, &mut assignments.squawk, || {
            generate_squawk(rng)
        });
        if self.transponder.is_none() {
            self.transponder = Some(squawk);
        }

        remember(&mut self.taxi_route, &mut assignments.taxi_route, || {
            generate_taxi_route(rng)
        });

        let meteo = self.meteo.get_or_insert_with(Meteo::default);
        let direction = remember(
            &mut meteo.wind_direction,
            &mut assignments.wind_direction,
            || generate_wind_direction(rng),
        );
        let speed = remember(&mut meteo.wind_speed, &mut assignments.wind_speed, || {
            generate_wind_speed(rng)
        });
        remember(&mut meteo.qnh, &mut assignments.qnh, || generate_qnh(rng));

        if meteo.wind.is_none() {
            meteo.wind = Some(format!("{direction:03}/{speed:02}"));
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty.unwrap_or_default()
    }

    /// Squawk the controller should hear, in the order pilots are told it.
    pub fn transponder_code(&self) -> Option<&str> {
        self.transponder
            .as_deref()
            .or(self.squawk.as_deref())
            .or_else(|| self.meteo.as_ref().and_then(|m| m.transponder.as_deref()))
    }

    pub fn record_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Moves the session to `phase_id`; a phase with its own frequency group
    /// makes that group both the default and the active one.
    pub fn advance_to(&mut self, phase_id: &str, frequency_group: Option<&FrequencyGroup>) {
        self.phase_id = Some(phase_id.to_string());
        if let Some(group) = frequency_group {
            self.default_frequency_group = Some(group.clone());
            self.active_frequency_group = Some(group.clone());
        }
    }
}
