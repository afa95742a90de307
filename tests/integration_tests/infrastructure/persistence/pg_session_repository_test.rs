use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use radio_coach::application::ports::SessionRepository;
use radio_coach::domain::{SessionId, SessionState, Turn};

use crate::helpers::TestPostgres;

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_unknown_session_when_loading_then_returns_none() {
    let test_pg = TestPostgres::new().await;

    let loaded = test_pg
        .session_repository
        .load(SessionId::new())
        .await
        .expect("Failed to load session");

    assert!(loaded.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_saved_state_when_loading_then_document_round_trips() {
    let test_pg = TestPostgres::new().await;
    let session_id = SessionId::new();
    let mut state = SessionState {
        scenario_id: Some("mrpv_full_flight".to_string()),
        phase_id: Some("tower_takeoff_request".to_string()),
        ..SessionState::default()
    };
    state.ensure_dynamic_assignments(&mut StdRng::seed_from_u64(11));
    state.record_turn(Turn::student("Torre, TI-ABC listo", "118.300"));
    state.extra.insert("instructor_notes".into(), json!({ "focus": "colación" }));

    test_pg
        .session_repository
        .save(session_id, &state)
        .await
        .expect("Failed to save session");

    let loaded = test_pg
        .session_repository
        .load(session_id)
        .await
        .expect("Failed to load session")
        .expect("Session not found");

    assert_eq!(loaded, state);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_existing_session_when_saving_again_then_document_is_replaced() {
    let test_pg = TestPostgres::new().await;
    let session_id = SessionId::new();
    let mut state = SessionState {
        phase_id: Some("ground_taxi_request".to_string()),
        ..SessionState::default()
    };
    state.extra.insert("stale".into(), Value::Bool(true));
    test_pg
        .session_repository
        .save(session_id, &state)
        .await
        .expect("Failed to save first version");

    state.phase_id = Some("departure_report".to_string());
    state.extra.clear();
    test_pg
        .session_repository
        .save(session_id, &state)
        .await
        .expect("Failed to save second version");

    let loaded = test_pg
        .session_repository
        .load(session_id)
        .await
        .expect("Failed to load session")
        .expect("Session not found");
    assert_eq!(loaded.phase_id.as_deref(), Some("departure_report"));
    assert!(!loaded.extra.contains_key("stale"));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_contexts WHERE session_id = $1")
        .bind(session_id.as_uuid())
        .fetch_one(&test_pg.pool)
        .await
        .expect("Failed to count rows");
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_stored_document_that_is_not_an_object_when_loading_then_session_starts_fresh() {
    let test_pg = TestPostgres::new().await;
    let session_id = SessionId::new();
    sqlx::query(
        "INSERT INTO training_contexts (session_id, context, created_at, updated_at) VALUES ($1, $2, NOW(), NOW())",
    )
    .bind(session_id.as_uuid())
    .bind(sqlx::types::Json(json!(["not", "a", "session"])))
    .execute(&test_pg.pool)
    .await
    .expect("Failed to insert raw document");

    let loaded = test_pg
        .session_repository
        .load(session_id)
        .await
        .expect("Load should not fail on an unreadable document");

    assert!(loaded.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_hand_edited_document_when_loading_then_off_shape_fields_are_tolerated() {
    let test_pg = TestPostgres::new().await;
    let session_id = SessionId::new();
    sqlx::query(
        "INSERT INTO training_contexts (session_id, context, created_at, updated_at) VALUES ($1, $2, NOW(), NOW())",
    )
    .bind(session_id.as_uuid())
    .bind(sqlx::types::Json(json!({
        "phase_id": 12,
        "difficulty": "7",
        "turns": [
            { "role": "instructor", "text": "nota" },
            { "role": "student", "text": "Torre", "confidence": "0.9" }
        ]
    })))
    .execute(&test_pg.pool)
    .await
    .expect("Failed to insert raw document");

    let loaded = test_pg
        .session_repository
        .load(session_id)
        .await
        .expect("Failed to load session")
        .expect("Session not found");

    assert_eq!(loaded.phase_id.as_deref(), Some("12"));
    assert_eq!(loaded.difficulty().level(), 7);
    assert_eq!(loaded.turns.len(), 1);
}
