use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use radio_coach::application::services::{PhaseResolutionError, ScenarioResolver};
use radio_coach::domain::{AirportProfile, FrequencyGroup, Meteo, Scenario, SessionId, SessionState};
use radio_coach::infrastructure::scenarios::FileScenarioCatalog;

fn demo_scenario() -> Scenario {
    serde_json::from_value(json!({
        "id": "demo",
        "name": "Demo",
        "default_phase": "takeoff",
        "frequencies": { "ground": "121.900", "tower": "118.300" },
        "phases": [
            { "id": "taxi", "intent": "request_taxi", "frequency": "ground" },
            { "id": "takeoff", "intent": "request_takeoff", "frequency": "tower", "runway_human": "dos cero" },
            { "id": "briefing", "frequency": "unknown" }
        ]
    }))
    .unwrap()
}

fn airport() -> AirportProfile {
    AirportProfile {
        alternate_runway: Some("tres cero".to_string()),
        ..AirportProfile::new("MRPV")
    }
}

fn resolver_with(scenarios: Vec<(&str, Scenario)>) -> ScenarioResolver {
    let scenarios: BTreeMap<String, Scenario> = scenarios
        .into_iter()
        .map(|(id, scenario)| (id.to_string(), scenario))
        .collect();
    ScenarioResolver::new(Arc::new(FileScenarioCatalog::new(scenarios, "demo", airport())))
}

fn resolver() -> ScenarioResolver {
    resolver_with(vec![("demo", demo_scenario())])
}

#[test]
fn given_fresh_session_when_resolving_then_default_scenario_and_phase_apply() {
    let context = resolver().resolve(SessionId::new(), &SessionState::default());

    assert_eq!(context.scenario_id, "demo");
    assert_eq!(context.phase_id.as_deref(), Some("takeoff"));
    assert_eq!(context.active_frequency_group, FrequencyGroup::Tower);
    assert_eq!(context.expected_frequency(&FrequencyGroup::Ground), Some("121.900"));
    assert_eq!(context.airport, "MRPV");
    assert_eq!(context.default_runway, "dos cero");
    assert_eq!(context.alternate_runway.as_deref(), Some("tres cero"));
}

#[test]
fn given_stored_phase_when_resolving_then_its_frequency_group_is_active() {
    let state = SessionState {
        phase_id: Some("taxi".to_string()),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    assert_eq!(context.phase_id.as_deref(), Some("taxi"));
    assert_eq!(context.active_frequency_group, FrequencyGroup::Ground);
    assert_eq!(context.default_runway, "uno cero");
}

#[test]
fn given_stale_phase_id_when_resolving_then_falls_back_to_default_phase() {
    let state = SessionState {
        phase_id: Some("removed_phase".to_string()),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    assert_eq!(context.phase_id.as_deref(), Some("takeoff"));
}

#[test]
fn given_scenario_without_default_phase_when_resolving_then_first_phase_applies() {
    let mut scenario = demo_scenario();
    scenario.default_phase = None;

    let context = resolver_with(vec![("demo", scenario)]).resolve(SessionId::new(), &SessionState::default());

    assert_eq!(context.phase_id.as_deref(), Some("taxi"));
}

#[test]
fn given_unknown_scenario_id_when_resolving_then_default_template_is_used() {
    let state = SessionState {
        scenario_id: Some("missing".to_string()),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    assert_eq!(context.scenario_id, "missing");
    assert_eq!(context.scenario.name.as_deref(), Some("Demo"));
    assert_eq!(context.phase_map.len(), 3);
}

#[test]
fn given_session_values_when_resolving_then_they_are_projected_into_phases() {
    let mut student = Map::new();
    student.insert("callsign".into(), Value::from("TI-ABC"));
    let state = SessionState {
        meteo: Some(Meteo {
            wind: Some("070/08".to_string()),
            qnh: Some("3005".to_string()),
            ..Meteo::default()
        }),
        squawk: Some("0542".to_string()),
        taxi_route: Some("Alfa, Bravo".to_string()),
        student: Some(student),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    let shared = &context.scenario.shared;
    assert_eq!(shared["wind_direction"], json!(70));
    assert_eq!(shared["wind_speed"], json!(8));
    assert_eq!(shared["qnh"], json!("3005"));
    assert_eq!(shared["student"]["callsign"], json!("TI-ABC"));
    let taxi = &context.phase_map["taxi"];
    assert_eq!(taxi.data["squawk"], json!("0542"));
    assert_eq!(taxi.data["taxi_route"], json!("Alfa, Bravo"));
}

#[test]
fn given_top_level_overrides_when_resolving_then_they_replace_template_keys() {
    let mut overrides = Map::new();
    overrides.insert("name".into(), Value::from("Vuelo nocturno"));
    overrides.insert("frequencies".into(), json!({ "tower": "118.700" }));
    let state = SessionState {
        scenario_overrides: Some(overrides),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    assert_eq!(context.scenario.name.as_deref(), Some("Vuelo nocturno"));
    assert_eq!(context.expected_frequency(&FrequencyGroup::Tower), Some("118.700"));
    assert_eq!(context.expected_frequency(&FrequencyGroup::Ground), None);
}

#[test]
fn given_empty_catalog_when_requiring_phase_then_no_active_phase() {
    let context = resolver_with(vec![]).resolve(SessionId::new(), &SessionState::default());

    assert!(context.phase_id.is_none());
    assert_eq!(
        context.require_active_phase().unwrap_err(),
        PhaseResolutionError::NoActivePhase
    );
}

#[test]
fn given_phase_without_intent_when_requiring_phase_then_missing_intent() {
    let state = SessionState {
        phase_id: Some("briefing".to_string()),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    assert_eq!(
        context.require_active_phase().unwrap_err(),
        PhaseResolutionError::MissingIntent("briefing".to_string())
    );
}

#[test]
fn given_placeholder_phase_group_when_resolving_then_session_group_is_used() {
    let state = SessionState {
        phase_id: Some("briefing".to_string()),
        active_frequency_group: Some(FrequencyGroup::Approach),
        ..SessionState::default()
    };

    let context = resolver().resolve(SessionId::new(), &state);

    assert_eq!(context.active_frequency_group, FrequencyGroup::Approach);
}
