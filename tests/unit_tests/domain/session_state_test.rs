use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

use radio_coach::domain::{Difficulty, FrequencyGroup, Meteo, SessionState, StrictnessTier, TAXI_ROUTES};

#[test]
fn given_fresh_session_when_ensuring_assignments_then_all_values_are_in_range() {
    let mut state = SessionState::default();

    state.ensure_dynamic_assignments(&mut StdRng::seed_from_u64(7));

    let squawk = state.squawk.clone().unwrap();
    assert_eq!(squawk.len(), 4);
    assert!(squawk.starts_with("05"));
    assert_eq!(state.transponder.as_deref(), Some(squawk.as_str()));
    assert!(TAXI_ROUTES.contains(&state.taxi_route.as_deref().unwrap()));

    let meteo = state.meteo.as_ref().unwrap();
    let direction = meteo.wind_direction.unwrap();
    let speed = meteo.wind_speed.unwrap();
    assert!((50..=100).contains(&direction) && direction % 10 == 0);
    assert!((6..=16).contains(&speed));
    assert_eq!(meteo.wind.clone().unwrap(), format!("{direction:03}/{speed:02}"));
    let qnh: u32 = meteo.qnh.as_deref().unwrap().parse().unwrap();
    assert!((3000..=3012).contains(&qnh));
}

#[test]
fn given_assigned_session_when_ensuring_again_then_values_are_memoized() {
    let mut state = SessionState::default();
    state.ensure_dynamic_assignments(&mut StdRng::seed_from_u64(1));
    let first = state.clone();

    state.ensure_dynamic_assignments(&mut StdRng::seed_from_u64(99));

    assert_eq!(state, first);
}

#[test]
fn given_session_values_when_ensuring_assignments_then_session_values_win() {
    let mut state = SessionState {
        squawk: Some("0542".into()),
        meteo: Some(Meteo {
            wind_direction: Some(120),
            qnh: Some("2992".into()),
            ..Meteo::default()
        }),
        ..SessionState::default()
    };

    state.ensure_dynamic_assignments(&mut StdRng::seed_from_u64(3));

    assert_eq!(state.dynamic_assignments.squawk.as_deref(), Some("0542"));
    assert_eq!(state.dynamic_assignments.wind_direction, Some(120));
    assert_eq!(state.dynamic_assignments.qnh.as_deref(), Some("2992"));
    assert_eq!(state.transponder_code(), Some("0542"));
}

#[test]
fn given_stored_document_when_deserializing_then_unknown_keys_are_kept() {
    let state: SessionState = serde_json::from_value(json!({
        "scenario_id": "mrpv_full_flight",
        "phase_id": "taxi",
        "squawk": 541,
        "difficulty": 9,
        "dynamic_assignments": { "windDirection": "70", "windSpeed": 8 },
        "metar_raw": "MRPV 121200Z 07008KT"
    }))
    .unwrap();

    assert_eq!(state.squawk.as_deref(), Some("541"));
    assert_eq!(state.difficulty().tier(), StrictnessTier::Strict);
    assert_eq!(state.dynamic_assignments.wind_direction, Some(70));

    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(value["metar_raw"], "MRPV 121200Z 07008KT");
    assert_eq!(value["dynamic_assignments"]["windSpeed"], 8);
}

#[test]
fn given_phase_with_group_when_advancing_then_group_becomes_default_and_active() {
    let mut state = SessionState::default();

    state.advance_to("departure", Some(&FrequencyGroup::Approach));

    assert_eq!(state.phase_id.as_deref(), Some("departure"));
    assert_eq!(state.default_frequency_group, Some(FrequencyGroup::Approach));
    assert_eq!(state.active_frequency_group, Some(FrequencyGroup::Approach));
}

#[test]
fn given_out_of_range_difficulty_when_building_then_clamped() {
    assert_eq!(Difficulty::new(42).level(), Difficulty::MAX);
    assert_eq!(Difficulty::new(-3).tier(), StrictnessTier::Relaxed);
    assert_eq!(Difficulty::default().tier(), StrictnessTier::Normal);
}

#[test]
fn given_hand_edited_scalars_when_deserializing_then_values_are_coerced() {
    let state: SessionState = serde_json::from_value(json!({
        "phase_id": 12,
        "difficulty": "7",
        "user_id": "not-a-uuid",
        "active_frequency_group": 3
    }))
    .unwrap();

    assert_eq!(state.phase_id.as_deref(), Some("12"));
    assert_eq!(state.difficulty().level(), 7);
    assert!(state.user_id.is_none());
    assert!(state.active_frequency_group.is_none());
}

#[test]
fn given_turn_with_unknown_role_when_deserializing_then_only_that_turn_is_dropped() {
    let state: SessionState = serde_json::from_value(json!({
        "turns": [
            { "role": "instructor", "text": "nota interna" },
            { "role": "student", "text": "Torre, TI-ABC listo", "confidence": "0.9", "score": "80" },
            "garbage"
        ]
    }))
    .unwrap();

    assert_eq!(state.turns.len(), 1);
    let turn = state.turns.last().unwrap();
    assert_eq!(turn.text, "Torre, TI-ABC listo");
    assert_eq!(turn.confidence, Some(0.9));
    assert_eq!(turn.score, Some(80.0));
}

#[test]
fn given_turn_timestamp_without_zone_when_deserializing_then_read_as_utc() {
    let state: SessionState = serde_json::from_value(json!({
        "turns": [{ "role": "controller", "text": "Colación correcta", "timestamp": "2024-05-01T12:30:00" }]
    }))
    .unwrap();

    let turn = state.turns.last().unwrap();
    assert_eq!(turn.timestamp.to_rfc3339(), "2024-05-01T12:30:00+00:00");
}

#[test]
fn given_turns_that_are_not_a_list_when_deserializing_then_history_is_empty() {
    let state: SessionState = serde_json::from_value(json!({
        "phase_id": "taxi",
        "turns": { "oops": true },
        "dynamic_assignments": "none"
    }))
    .unwrap();

    assert!(state.turns.is_empty());
    assert_eq!(state.dynamic_assignments, Default::default());
    assert_eq!(state.phase_id.as_deref(), Some("taxi"));
}
