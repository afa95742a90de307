use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::ports::ScenarioCatalog;
use crate::domain::{
    FrequencyGroup, FrequencyMap, Phase, PhaseMap, Scenario, SessionId, SessionState,
};

/// Scenario and phase as seen by one turn, after session overrides.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub airport: String,
    pub scenario_id: String,
    pub scenario: Scenario,
    pub phase_map: PhaseMap,
    pub phase_id: Option<String>,
    pub frequencies: FrequencyMap,
    pub default_frequency_group: Option<FrequencyGroup>,
    pub active_frequency_group: FrequencyGroup,
    pub default_runway: String,
    pub alternate_runway: Option<String>,
}

/// The phase a transmission is graded against.
#[derive(Debug, Clone)]
pub struct ActivePhase {
    pub phase: Phase,
    pub intent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseResolutionError {
    #[error("no active phase configured for the session")]
    NoActivePhase,
    #[error("active phase {0} has no intent configured")]
    MissingIntent(String),
}

impl SessionContext {
    pub fn active_phase(&self) -> Option<&Phase> {
        self.phase_id.as_ref().and_then(|id| self.phase_map.get(id))
    }

    pub fn require_active_phase(&self) -> Result<ActivePhase, PhaseResolutionError> {
        let phase = self
            .active_phase()
            .ok_or(PhaseResolutionError::NoActivePhase)?;
        let intent = phase
            .expected_intent()
            .ok_or_else(|| PhaseResolutionError::MissingIntent(phase.id.clone()))?;
        Ok(ActivePhase {
            intent: intent.to_string(),
            phase: phase.clone(),
        })
    }

    pub fn expected_frequency(&self, group: &FrequencyGroup) -> Option<&str> {
        self.frequencies.get(group).map(String::as_str)
    }
}

pub struct ScenarioResolver {
    catalog: Arc<dyn ScenarioCatalog>,
}

impl ScenarioResolver {
    pub fn new(catalog: Arc<dyn ScenarioCatalog>) -> Self {
        Self { catalog }
    }

    /// Builds the turn's view of the scenario. Read-only with respect to
    /// `state`; the caller decides what gets persisted.
    #[tracing::instrument(skip(self, state), fields(session_id = %session_id))]
    pub fn resolve(&self, session_id: SessionId, state: &SessionState) -> SessionContext {
        let scenario_id = state
            .scenario_id
            .as_deref()
            .or_else(|| state.scenario.as_ref().and_then(|s| s.id.as_deref()))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.catalog.default_scenario_id())
            .to_string();

        let mut scenario = match &state.scenario {
            Some(snapshot) => snapshot.clone(),
            None => self
                .catalog
                .scenario(&scenario_id)
                .or_else(|| self.catalog.scenario(self.catalog.default_scenario_id()))
                .cloned()
                .unwrap_or_else(|| {
                    tracing::warn!(scenario_id = %scenario_id, "Scenario not found in catalog");
                    Scenario::default()
                }),
        };

        apply_session_overrides(&mut scenario, state);
        if scenario.id.is_none() {
            scenario.id = Some(scenario_id.clone());
        }

        let phase_map = scenario.phase_map();
        let phase_id = [
            state.phase_id.as_deref(),
            scenario.default_phase.as_deref(),
            scenario.first_phase_id(),
        ]
        .into_iter()
        .flatten()
        .find(|id| phase_map.contains_key(*id))
        .map(str::to_string);

        let active_phase = phase_id.as_ref().and_then(|id| phase_map.get(id));

        let frequencies = if scenario.frequencies.is_empty() {
            state.frequencies.clone()
        } else {
            scenario.frequencies.clone()
        };

        let default_frequency_group = state
            .default_frequency_group
            .clone()
            .or_else(|| scenario.default_frequency_group.clone())
            .or_else(|| active_phase.and_then(|p| p.frequency_group().cloned()));

        let active_frequency_group = active_phase
            .and_then(|p| p.frequency_group().cloned())
            .or_else(|| state.active_frequency_group.clone())
            .or_else(|| state.default_frequency_group.clone())
            .or_else(|| scenario.default_frequency_group.clone())
            .filter(|group| !group.is_placeholder())
            .unwrap_or_default();

        let airport = self.catalog.airport();
        let default_runway = active_phase
            .and_then(|p| p.runway_human.clone())
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| airport.default_runway.clone());

        tracing::debug!(
            scenario_id = %scenario_id,
            phase_id = ?phase_id,
            phases = phase_map.len(),
            "Session context resolved"
        );

        SessionContext {
            session_id,
            airport: scenario.airport.clone().unwrap_or_else(|| airport.icao.clone()),
            scenario_id,
            scenario,
            phase_map,
            phase_id,
            frequencies,
            default_frequency_group,
            active_frequency_group,
            default_runway,
            alternate_runway: airport.alternate_runway.clone(),
        }
    }
}

/// Projects live session values (weather, squawk, taxi route, student) into
/// the scenario copy so prompts and phase data see them.
fn apply_session_overrides(scenario: &mut Scenario, state: &SessionState) {
    let (wind_direction, wind_speed) = state
        .meteo
        .as_ref()
        .map(|m| m.wind_components())
        .unwrap_or((None, None));
    let qnh = state.meteo.as_ref().and_then(|m| m.qnh.clone());

    let mut common = Map::new();
    if let Some(direction) = wind_direction {
        common.insert("wind_direction".into(), Value::from(direction));
    }
    if let Some(speed) = wind_speed {
        common.insert("wind_speed".into(), Value::from(speed));
    }
    if let Some(qnh) = qnh {
        common.insert("qnh".into(), Value::String(qnh));
    }
    if let Some(squawk) = state.transponder_code() {
        common.insert("squawk".into(), Value::String(squawk.to_string()));
    }
    if let Some(route) = state.taxi_route.as_ref().filter(|r| !r.is_empty()) {
        common.insert("taxi_route".into(), Value::String(route.clone()));
    }

    for (key, value) in &common {
        scenario.shared.insert(key.clone(), value.clone());
    }

    if let Some(student) = state.student.as_ref().filter(|s| !s.is_empty()) {
        let section = scenario
            .shared
            .entry("student")
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(section) = section {
            for (key, value) in student {
                section.insert(key.clone(), value.clone());
            }
        }
    }

    if !common.is_empty() {
        for phase in &mut scenario.phases {
            for (key, value) in &common {
                phase.data.insert(key.clone(), value.clone());
            }
        }
    }

    if !state.frequencies.is_empty() {
        scenario.frequencies = state.frequencies.clone();
    }

    if let Some(overrides) = state.scenario_overrides.as_ref().filter(|o| !o.is_empty()) {
        apply_top_level_overrides(scenario, overrides);
    }
}

fn apply_top_level_overrides(scenario: &mut Scenario, overrides: &Map<String, Value>) {
    let merged = serde_json::to_value(&*scenario).and_then(|value| {
        let mut object = match value {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        for (key, value) in overrides {
            object.insert(key.clone(), value.clone());
        }
        serde_json::from_value::<Scenario>(Value::Object(object))
    });

    match merged {
        Ok(merged) => *scenario = merged,
        Err(e) => tracing::warn!(error = %e, "Ignoring scenario overrides that do not fit the scenario shape"),
    }
}
