use radio_coach::domain::{FrequencyGroup, GuidanceText, Scenario};
use serde_json::json;

fn scenario() -> Scenario {
    serde_json::from_value(json!({
        "id": "demo",
        "frequencies": { "tower": 118.3, "ground": "121.900" },
        "phases": [
            {
                "id": "taxi",
                "intent": "request_taxi",
                "frequency": "ground",
                "transitions": { "success": "takeoff", "onFailure": "taxi" },
                "llm": {
                    "role": "Superficie",
                    "studentChecklist": ["Indicativo", "Posición"],
                    "allowResponseRules": "Solo con indicativo"
                },
                "hint": "custom author field"
            },
            {
                "id": "takeoff",
                "intent": "request_takeoff_clearance",
                "frequency": "unknown",
                "transitions": { "onSuccess": "climb", "success": "ignored" }
            },
            { "name": "sin id" }
        ]
    }))
    .unwrap()
}

#[test]
fn given_numeric_frequency_when_deserializing_then_stored_as_text() {
    let scenario = scenario();

    assert_eq!(scenario.frequency_for(&FrequencyGroup::Tower), Some("118.3"));
    assert_eq!(scenario.frequency_for(&FrequencyGroup::Ground), Some("121.900"));
}

#[test]
fn given_phases_without_id_when_building_map_then_they_are_skipped() {
    let scenario = scenario();

    let map = scenario.phase_map();

    assert_eq!(map.len(), 2);
    assert_eq!(scenario.first_phase_id(), Some("taxi"));
}

#[test]
fn given_transition_spellings_when_reading_success_target_then_on_success_wins() {
    let map = scenario().phase_map();

    assert_eq!(map["taxi"].transitions.on_success_target(), Some("takeoff"));
    assert_eq!(map["taxi"].transitions.other.get("onFailure"), Some(&json!("taxi")));
    assert_eq!(map["takeoff"].transitions.on_success_target(), Some("climb"));
}

#[test]
fn given_guidance_as_list_or_sentence_when_reading_then_both_yield_items() {
    let map = scenario().phase_map();
    let llm = map["taxi"].llm.as_ref().unwrap();

    assert!(matches!(llm.student_checklist, Some(GuidanceText::Items(_))));
    assert_eq!(
        llm.allow_response_rules.as_ref().unwrap().items(),
        vec!["Solo con indicativo".to_string()]
    );
    assert_eq!(map["taxi"].controller_role(), Some("Superficie"));
}

#[test]
fn given_placeholder_group_when_reading_phase_frequency_then_ignored() {
    let map = scenario().phase_map();

    assert_eq!(map["takeoff"].frequency_group(), None);
    assert_eq!(map["taxi"].frequency_group(), Some(&FrequencyGroup::Ground));
}

#[test]
fn given_unknown_phase_fields_when_serializing_then_they_survive() {
    let map = scenario().phase_map();

    let value = serde_json::to_value(&map["taxi"]).unwrap();

    assert_eq!(value["hint"], "custom author field");
    assert_eq!(value["transitions"]["onFailure"], "taxi");
}
