use radio_coach::domain::{MAX_TURNS_STORED, Turn, TurnHistory, TurnRole};

fn history_with(count: usize) -> TurnHistory {
    let mut history = TurnHistory::new();
    for i in 0..count {
        history.push(Turn::student(format!("llamada {i}"), "118.300"));
    }
    history
}

#[test]
fn given_more_turns_than_capacity_when_pushing_then_oldest_are_dropped() {
    let history = history_with(MAX_TURNS_STORED + 5);

    assert_eq!(history.len(), MAX_TURNS_STORED);
    assert_eq!(history.iter().next().unwrap().text, "llamada 5");
    assert_eq!(
        history.last().unwrap().text,
        format!("llamada {}", MAX_TURNS_STORED + 4)
    );
}

#[test]
fn given_long_history_when_taking_recent_turns_then_returns_tail_in_order() {
    let history = history_with(12);

    let recent: Vec<&str> = history.recent(8).map(|t| t.text.as_str()).collect();

    assert_eq!(recent.len(), 8);
    assert_eq!(recent.first(), Some(&"llamada 4"));
    assert_eq!(recent.last(), Some(&"llamada 11"));
}

#[test]
fn given_oversized_stored_list_when_deserializing_then_history_is_bounded() {
    let turns: Vec<Turn> = (0..50).map(|i| Turn::new(TurnRole::Controller, format!("t{i}"))).collect();
    let json = serde_json::to_value(&turns).unwrap();

    let history: TurnHistory = serde_json::from_value(json).unwrap();

    assert_eq!(history.len(), MAX_TURNS_STORED);
    assert_eq!(history.iter().next().unwrap().text, "t10");
}
